//! Guidance algorithms for bay missiles.
//!
//! Provides rate-limited steering for homing missiles, lead prediction
//! against smoothed lock velocities, and cubic Bezier path construction
//! for spline missiles.

use glam::Vec3;
use rand::Rng;

use skirmish_core::constants::*;

/// Rotate `velocity` toward `desired_direction` by at most `max_turn_rate * dt` radians.
///
/// The turn is a linear blend between the current and desired unit
/// directions, renormalized to `speed`. A zero desired direction leaves
/// the velocity untouched; a zero velocity snaps onto the desired direction.
pub fn steer_toward(
    velocity: Vec3,
    desired_direction: Vec3,
    speed: f32,
    max_turn_rate: f32,
    dt: f32,
) -> Vec3 {
    let desired = desired_direction.normalize_or_zero();
    if desired == Vec3::ZERO {
        return velocity;
    }
    let current = velocity.normalize_or_zero();
    if current == Vec3::ZERO {
        return desired * speed;
    }

    let angle = current.angle_between(desired);
    let max_turn = (max_turn_rate * dt).max(0.0);
    let blend = if angle > max_turn && angle > 1e-6 {
        max_turn / angle
    } else {
        1.0
    };

    let direction = current.lerp(desired, blend).normalize_or_zero();
    if direction == Vec3::ZERO {
        // Exactly opposite directions cancel; hold course this frame.
        return current * speed;
    }
    direction * speed
}

/// Aim point leading a moving target.
///
/// Lead time is the straight-line travel time scaled by `lead_factor`,
/// clamped to [`LEAD_SECS_MIN`, `LEAD_SECS_MAX`]. Returns the predicted
/// point and the lead time used.
pub fn predict_target_position(
    from: Vec3,
    target_center: Vec3,
    target_velocity: Vec3,
    missile_speed: f32,
    lead_factor: f32,
) -> (Vec3, f32) {
    let travel_secs = if missile_speed > 1e-3 {
        from.distance(target_center) / missile_speed
    } else {
        0.0
    };
    let lead = (travel_secs * lead_factor).clamp(LEAD_SECS_MIN, LEAD_SECS_MAX);
    (target_center + target_velocity * lead, lead)
}

/// Cubic Bezier curve through four control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl CubicBezier {
    pub fn point(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }

    /// First derivative with respect to `t`.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Polyline length over `samples` equal parameter steps.
    pub fn approx_length(&self, samples: usize) -> f32 {
        let samples = samples.max(1);
        let mut length = 0.0;
        let mut previous = self.p0;
        for i in 1..=samples {
            let point = self.point(i as f32 / samples as f32);
            length += previous.distance(point);
            previous = point;
        }
        length
    }
}

/// Build a jittered path from `start` to `destination`.
///
/// The first control point leaves along `launch_direction`; both inner
/// control points are pushed sideways and vertically by random offsets
/// proportional to `wildness` and the chord length.
pub fn build_spline_path<R: Rng>(
    start: Vec3,
    launch_direction: Vec3,
    destination: Vec3,
    wildness: f32,
    rng: &mut R,
) -> CubicBezier {
    let chord = destination - start;
    let length = chord.length().max(1.0);
    let mut along = chord.normalize_or_zero();
    if along == Vec3::ZERO {
        along = launch_direction.normalize_or_zero();
    }
    let mut lateral = Vec3::Y.cross(along).normalize_or_zero();
    if lateral == Vec3::ZERO {
        lateral = Vec3::X;
    }
    let launch = match launch_direction.normalize_or_zero() {
        v if v == Vec3::ZERO => along,
        v => v,
    };

    let wildness = wildness.max(0.0);
    let lateral_span = SPLINE_LATERAL_JITTER * wildness * length;
    let vertical_span = SPLINE_VERTICAL_JITTER * wildness * length;

    let p1 = start
        + launch * (length * 0.3)
        + lateral * (rng.gen_range(-1.0f32..=1.0) * lateral_span)
        + Vec3::Y * (rng.gen_range(0.0f32..=1.0) * vertical_span);
    let p2 = start
        + chord * 0.7
        + lateral * (rng.gen_range(-1.0f32..=1.0) * lateral_span)
        + Vec3::Y * (rng.gen_range(-1.0f32..=1.0) * vertical_span);

    CubicBezier {
        p0: start,
        p1,
        p2,
        p3: destination,
    }
}

/// Flight time for a spline of `length` at `speed`, clamped to the allowed window.
pub fn spline_duration(length: f32, speed: f32) -> f32 {
    if speed <= 1e-3 || !length.is_finite() {
        return SPLINE_DURATION_MAX_SECS;
    }
    (length / speed).clamp(SPLINE_DURATION_MIN_SECS, SPLINE_DURATION_MAX_SECS)
}

/// True when `aim` lies within `half_angle` of `forward` as seen from `origin` on the XZ plane.
pub fn aim_within_cone(origin: Vec3, forward: Vec3, aim: Vec3, half_angle: f32) -> bool {
    let to_aim = Vec3::new(aim.x - origin.x, 0.0, aim.z - origin.z);
    let forward = Vec3::new(forward.x, 0.0, forward.z);
    if to_aim.length_squared() < 1e-6 || forward.length_squared() < 1e-6 {
        return false;
    }
    forward.angle_between(to_aim) <= half_angle
}

/// Uniform random point inside a horizontal disc of `radius` around `center`.
pub fn scatter_on_disc<R: Rng>(center: Vec3, radius: f32, rng: &mut R) -> Vec3 {
    if radius <= 0.0 {
        return center;
    }
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = radius * rng.gen::<f32>().sqrt();
    center + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}
