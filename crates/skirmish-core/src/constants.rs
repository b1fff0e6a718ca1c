//! Simulation constants and tuning parameters.

use std::f32::consts::PI;

/// Default frame rate used by the headless arena (Hz).
pub const FRAME_RATE: u32 = 60;

/// Seconds per frame at the default frame rate.
pub const DT: f32 = 1.0 / FRAME_RATE as f32;

// --- Health ---

/// Remaining base damage below this is treated as fully absorbed.
pub const DAMAGE_EPSILON: f32 = 1e-5;

// --- Target lock ---

/// A locked target that stays off-screen this long is dropped (seconds).
pub const LOCK_OFFSCREEN_GRACE_SECS: f32 = 3.0;

/// Blend factor applied to each new lock velocity sample.
pub const LOCK_VELOCITY_SMOOTHING: f32 = 0.35;

/// Normalized-device bound used for on-screen tests.
pub const NDC_LIMIT: f32 = 1.0;

/// Tolerance applied when comparing accumulated lock time to the acquire threshold.
pub const LOCK_EPSILON: f32 = 1e-4;

// --- Launchers ---

/// Tolerance applied when comparing accumulated reload time to the reload period.
pub const RELOAD_EPSILON: f32 = 1e-5;

/// Upper bound on simultaneously active missiles per bay.
pub const MAX_ACTIVE_MISSILES: usize = 96;

// --- Missile flight ---

/// Unguided phase after launch for homing missiles (seconds).
pub const MISSILE_HOMING_DELAY_SECS: f32 = 0.5;

/// Maximum homing turn rate (rad/s, 110 deg/s).
pub const MISSILE_HOMING_TURN_RATE_RADIANS_PER_SECOND: f32 = 110.0 * PI / 180.0;

/// Lower bound of the predictive lead time (seconds).
pub const LEAD_SECS_MIN: f32 = 0.05;

/// Upper bound of the predictive lead time (seconds).
pub const LEAD_SECS_MAX: f32 = 1.5;

/// Shortest allowed spline flight (seconds).
pub const SPLINE_DURATION_MIN_SECS: f32 = 0.22;

/// Longest allowed spline flight (seconds).
pub const SPLINE_DURATION_MAX_SECS: f32 = 2.8;

/// Samples used to approximate Bezier arc length.
pub const SPLINE_LENGTH_SAMPLES: usize = 12;

/// Lateral control-point jitter at wildness 1.0, as a fraction of path length.
pub const SPLINE_LATERAL_JITTER: f32 = 0.35;

/// Vertical control-point jitter at wildness 1.0, as a fraction of path length.
pub const SPLINE_VERTICAL_JITTER: f32 = 0.2;

/// Rate at which spline missiles turn their nose toward the path tangent (1/s).
pub const SPLINE_ORIENTATION_SMOOTHING: f32 = 14.0;

/// Distance of the straight-ahead fallback point when nothing is aimed (units).
pub const STRAIGHT_AHEAD_FALLBACK_DISTANCE: f32 = 60.0;

/// Half-angle of the cone around ship forward in which the reticle may steer unlocked missiles.
pub const AIM_FALLBACK_CONE_RADIANS: f32 = 40.0 * PI / 180.0;

/// Extra flight time granted to spline missiles beyond their path duration (seconds).
pub const SPLINE_LIFETIME_MARGIN_SECS: f32 = 0.5;

// --- Visual bookkeeping ---

/// Lifetime of an explosion flash (seconds).
pub const EXPLOSION_FLASH_SECS: f32 = 0.25;

/// Duration of the HUD "fired" flash after a volley (seconds).
pub const FIRED_FLASH_SECS: f32 = 0.12;

// --- Arena ---

/// Delay between a target's destruction and its removal from the arena (seconds).
pub const TARGET_DESPAWN_DELAY_SECS: f32 = 1.5;
