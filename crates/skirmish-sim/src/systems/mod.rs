//! ECS systems that operate on the arena world each tick.
//!
//! Systems are plain functions over `&mut World` (or `&World` for read-only).
//! The missile bay is driven separately by the engine.

pub mod cleanup;
pub mod movement;
pub mod regen;
pub mod snapshot;
