//! Snapshot system: reads the world and the bay into an `ArenaSnapshot`.
//!
//! Read-only; never modifies the world.

use hecs::World;

use skirmish_core::components::Hurtbox;
use skirmish_core::events::CombatEvent;
use skirmish_core::state::{ArenaSnapshot, TargetView};
use skirmish_core::types::{Position, SimTime};
use skirmish_health::HealthComponent;

use crate::collision::hurtbox_center;
use crate::missile_bay::MissileBayController;

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    bay: &MissileBayController,
    events: Vec<CombatEvent>,
) -> ArenaSnapshot {
    ArenaSnapshot {
        time: *time,
        bay: bay.status(),
        targets: build_targets(world),
        locks: bay.lock_indicators(),
        missiles: bay.missiles().iter().map(|m| m.position).collect(),
        explosions: bay.explosion_flashes(),
        events,
    }
}

/// Targets sorted by hurtbox id so snapshots are stable across archetype moves.
fn build_targets(world: &World) -> Vec<TargetView> {
    let mut targets: Vec<TargetView> = world
        .query::<(&Hurtbox, &HealthComponent, &Position)>()
        .iter()
        .map(|(_entity, (hurtbox, health, position))| TargetView {
            hurtbox_id: hurtbox.id,
            position: hurtbox_center(hurtbox, position),
            radius: hurtbox.radius,
            enabled: hurtbox.enabled,
            health: health.snapshot(),
        })
        .collect();
    targets.sort_by_key(|t| t.hurtbox_id);
    targets
}
