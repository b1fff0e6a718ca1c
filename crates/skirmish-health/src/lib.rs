//! Layered health for skirmish entities.
//!
//! Shield, armor and hull absorb damage in that order, each scaled by
//! per-damage-type multipliers. Pure data and functions, no ECS dependency.

pub mod health;
pub mod multipliers;

pub use health::{HealthComponent, HealthConfig, LayerHealth};
pub use multipliers::{DamageMultipliers, LayerMultipliers, TypeMultipliers};
