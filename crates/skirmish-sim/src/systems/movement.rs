//! Kinematic integration: position += velocity * dt.

use hecs::World;

use skirmish_core::types::{Position, Velocity};

/// Integrate every entity with Position + Velocity.
pub fn run(world: &mut World, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    for (_entity, (position, velocity)) in world.query_mut::<(&mut Position, &Velocity)>() {
        position.0 += velocity.0 * dt;
    }
}
