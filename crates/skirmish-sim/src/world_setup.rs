//! Entity spawn factories and launcher layouts for the arena.

use glam::Vec3;
use hecs::{Entity, World};

use skirmish_core::catalog::MissileBayComponentDefinition;
use skirmish_core::components::{Hurtbox, Target};
use skirmish_core::enums::Faction;
use skirmish_core::ids::{HurtboxId, IdAllocator};
use skirmish_core::types::{Position, Velocity};
use skirmish_health::{HealthComponent, HealthConfig};

use crate::missile_bay::LauncherConfig;

/// Everything needed to place one target in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpawn {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub faction: Option<Faction>,
    pub health: HealthConfig,
}

impl Default for TargetSpawn {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            radius: 1.0,
            faction: Some(Faction::Enemy),
            health: default_target_health(),
        }
    }
}

impl TargetSpawn {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn moving(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_health(mut self, health: HealthConfig) -> Self {
        self.health = health;
        self
    }
}

/// Light drone: small shield over a hull.
pub fn default_target_health() -> HealthConfig {
    HealthConfig {
        shield_max: 20.0,
        hull_max: 60.0,
        shield_charge_rate: 5.0,
        shield_recharge_delay_secs: 2.0,
        ..HealthConfig::default()
    }
}

/// Spawn a lockable target entity.
pub fn spawn_target(
    world: &mut World,
    ids: &mut IdAllocator,
    spawn: TargetSpawn,
) -> (Entity, HurtboxId) {
    let id = ids.next_hurtbox();
    let entity = world.spawn((
        Target,
        Position(spawn.position),
        Velocity(spawn.velocity),
        Hurtbox::new(id, spawn.radius, spawn.faction),
        HealthComponent::new(spawn.health),
    ));
    (entity, id)
}

/// Spawn `count` stationary targets on an arc in front of the origin (facing +Z).
pub fn spawn_practice_targets(
    world: &mut World,
    ids: &mut IdAllocator,
    count: usize,
    range: f32,
) -> Vec<HurtboxId> {
    let spread = std::f32::consts::FRAC_PI_3;
    (0..count)
        .map(|i| {
            let t = if count > 1 {
                i as f32 / (count - 1) as f32 - 0.5
            } else {
                0.0
            };
            let bearing = t * spread;
            let position = Vec3::new(bearing.sin() * range, 0.0, bearing.cos() * range);
            spawn_target(world, ids, TargetSpawn::at(position)).1
        })
        .collect()
}

/// Cell offsets for `launchers` groups of `cells` each, alternating wing sides.
pub fn launcher_layout(launchers: usize, cells: usize) -> Vec<Vec<Vec3>> {
    (0..launchers)
        .map(|group| {
            let side = if group % 2 == 0 { -1.0 } else { 1.0 };
            let row = (group / 2) as f32;
            (0..cells)
                .map(|cell| Vec3::new(side * (1.5 + 0.4 * cell as f32), 0.3, -0.5 * row))
                .collect()
        })
        .collect()
}

/// Load every layout group with the same payload.
pub fn build_launchers(
    layout: &[Vec<Vec3>],
    payload: &MissileBayComponentDefinition,
) -> Vec<LauncherConfig> {
    layout
        .iter()
        .map(|cells| LauncherConfig::new(cells.clone(), payload.clone()))
        .collect()
}
