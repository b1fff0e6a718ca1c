//! Missiles in flight and their per-frame motion.

use glam::Vec3;

use skirmish_core::catalog::MissileBayComponentDefinition;
use skirmish_core::constants::*;
use skirmish_core::enums::{DamageType, DetonationCause, FlightMode};
use skirmish_core::ids::{HurtboxId, MissileId};

use super::lock::LockRegistry;
use super::template::MissileTemplate;
use crate::collision::TargetSample;
use crate::guidance::{self, CubicBezier};

/// Precomputed path of a spline missile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplinePath {
    pub curve: CubicBezier,
    pub duration: f32,
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flight {
    /// Flies straight until the delay runs out, then steers at the target.
    Homing { delay_remaining: f32 },
    Spline(SplinePath),
}

/// Warhead and motion numbers copied from the payload at launch.
#[derive(Debug, Clone, PartialEq)]
pub struct Warhead {
    pub damage: f32,
    pub damage_type: DamageType,
    pub explosion_radius: f32,
    pub fuse_radius: f32,
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct ActiveMissile {
    pub id: MissileId,
    pub launcher: usize,
    pub flight: Flight,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Smoothed nose direction for rendering.
    pub heading: Vec3,
    pub life_remaining: f32,
    pub target: Option<HurtboxId>,
    pub warhead: Warhead,
    pub template: MissileTemplate,
}

impl SplinePath {
    /// Normalized progress along the path.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

impl Warhead {
    pub fn from_payload(payload: &MissileBayComponentDefinition) -> Self {
        Self {
            damage: payload.damage,
            damage_type: payload.damage_type.clone(),
            explosion_radius: payload.explosion_radius,
            fuse_radius: payload.fuse_radius,
            speed: payload.speed,
        }
    }
}

impl ActiveMissile {
    pub fn flight_mode(&self) -> FlightMode {
        match self.flight {
            Flight::Homing { .. } => FlightMode::Homing,
            Flight::Spline(_) => FlightMode::Spline,
        }
    }

    /// Move the missile by one frame.
    pub fn advance(&mut self, dt: f32, targets: &[TargetSample], registry: &LockRegistry) {
        if dt <= 0.0 {
            return;
        }
        self.life_remaining -= dt;

        match &mut self.flight {
            Flight::Homing { delay_remaining } => {
                let guided = *delay_remaining <= 0.0;
                *delay_remaining = (*delay_remaining - dt).max(0.0);
                if guided {
                    self.steer_at_target(dt, targets, registry);
                }
                self.position += self.velocity * dt;
                self.heading = self.velocity.normalize_or_zero();
            }
            Flight::Spline(path) => {
                path.elapsed = (path.elapsed + dt).min(path.duration);
                let t = path.progress();
                let next = path.curve.point(t);
                let tangent = path.curve.tangent(t).normalize_or_zero();
                self.velocity = (next - self.position) / dt;
                self.position = next;
                if tangent != Vec3::ZERO {
                    let blend = (SPLINE_ORIENTATION_SMOOTHING * dt).min(1.0);
                    let heading = self.heading.lerp(tangent, blend).normalize_or_zero();
                    self.heading = if heading == Vec3::ZERO { tangent } else { heading };
                }
            }
        }
    }

    fn steer_at_target(&mut self, dt: f32, targets: &[TargetSample], registry: &LockRegistry) {
        let find = |id: HurtboxId| targets.iter().find(|t| t.id == id && t.damageable);

        let mut target = self.target.and_then(find);
        if target.is_none() {
            self.target = registry.nearest_volley_target(self.position, targets);
            target = self.target.and_then(find);
        }
        let Some(target) = target else {
            return;
        };
        self.velocity = guidance::steer_toward(
            self.velocity,
            target.center - self.position,
            self.warhead.speed,
            MISSILE_HOMING_TURN_RATE_RADIANS_PER_SECOND,
            dt,
        );
    }

    /// Why this missile should explode this frame, if at all.
    ///
    /// Checked in order: proximity to any damageable target, completed
    /// spline path, expired lifetime.
    pub fn detonation_cause(&self, targets: &[TargetSample]) -> Option<DetonationCause> {
        let fused = targets.iter().any(|t| {
            let reach = self.warhead.fuse_radius + t.radius;
            t.damageable && self.position.distance_squared(t.center) <= reach * reach
        });
        if fused {
            return Some(DetonationCause::Proximity);
        }
        if let Flight::Spline(path) = &self.flight {
            if path.is_complete() {
                return Some(DetonationCause::PathComplete);
            }
        }
        if self.life_remaining <= 0.0 {
            return Some(DetonationCause::LifetimeExpired);
        }
        None
    }
}
