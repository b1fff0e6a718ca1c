//! Simulation engine for skirmish.
//!
//! Hosts the missile bay controller (launchers, lock state machine, missile
//! flight and detonation), the hitbox/hurtbox collision glue, and a headless
//! arena engine that owns a hecs world of targets for deterministic testing.

pub mod camera;
pub mod collision;
pub mod engine;
pub mod guidance;
pub mod missile_bay;
pub mod systems;
pub mod world_setup;

pub use engine::ArenaEngine;
pub use missile_bay::MissileBayController;
pub use skirmish_core as core;
pub use skirmish_health as health;

#[cfg(test)]
mod tests;
