//! Health regeneration for every entity with a health pool.

use hecs::World;

use skirmish_health::HealthComponent;

pub fn run(world: &mut World, dt: f32) {
    for (_entity, health) in world.query_mut::<&mut HealthComponent>() {
        health.update(dt);
    }
}
