//! Cleanup system: retires destroyed targets.
//!
//! A hurtbox whose health hits zero is disabled, reported once, and given a
//! despawn timer. Entities are removed when their timer runs out.

use hecs::{Entity, World};

use skirmish_core::components::{DespawnTimer, Hurtbox};
use skirmish_core::constants::TARGET_DESPAWN_DELAY_SECS;
use skirmish_core::events::CombatEvent;
use skirmish_health::HealthComponent;

/// Run one cleanup pass. `despawn_buffer` is reused between ticks.
pub fn run(
    world: &mut World,
    dt: f32,
    events: &mut Vec<CombatEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    // Newly destroyed targets: no timer yet.
    let mut newly_destroyed: Vec<Entity> = Vec::new();
    for (entity, (hurtbox, health, timer)) in
        world.query_mut::<(&mut Hurtbox, &HealthComponent, Option<&DespawnTimer>)>()
    {
        if !health.is_destroyed() || timer.is_some() {
            continue;
        }
        hurtbox.enabled = false;
        events.push(CombatEvent::TargetDestroyed {
            hurtbox_id: hurtbox.id,
        });
        newly_destroyed.push(entity);
    }
    for entity in newly_destroyed {
        let _ = world.insert_one(
            entity,
            DespawnTimer {
                remaining_secs: TARGET_DESPAWN_DELAY_SECS,
            },
        );
    }

    if dt > 0.0 {
        for (entity, timer) in world.query_mut::<&mut DespawnTimer>() {
            timer.remaining_secs -= dt;
            if timer.remaining_secs <= 0.0 {
                despawn_buffer.push(entity);
            }
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
