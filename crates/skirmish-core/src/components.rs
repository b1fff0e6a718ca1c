//! ECS components for hecs entities.
//!
//! Components are plain data. Collision and damage logic lives in the
//! simulation crate, not here.

use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{DamageType, Faction};
use crate::ids::{HitboxId, HurtboxId};

/// Damageable collision sphere. The owning entity also carries a
/// `HealthComponent` and a `Position`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hurtbox {
    pub id: HurtboxId,
    pub radius: f32,
    /// Offset from the owner's position.
    pub offset: Vec3,
    pub faction: Option<Faction>,
    /// Cleared when the owner's health is destroyed.
    pub enabled: bool,
}

/// Damage-dealing collision sphere carried by a projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hitbox {
    pub id: HitboxId,
    pub radius: f32,
    /// Offset from the owner's position.
    pub offset: Vec3,
    pub damage: f32,
    pub damage_type: DamageType,
    pub source_id: Option<u32>,
    pub source_faction: Option<Faction>,
    /// Hurtboxes this hitbox may damage over its lifetime.
    pub max_hits: u32,
    pub hit_count: u32,
    /// Hurtboxes already hit; each is damaged at most once.
    pub hit_ids: HashSet<HurtboxId>,
    pub enabled: bool,
}

/// Marks an arena entity as a lockable target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Target;

/// Counts down to despawning a destroyed target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DespawnTimer {
    pub remaining_secs: f32,
}

impl Hurtbox {
    pub fn new(id: HurtboxId, radius: f32, faction: Option<Faction>) -> Self {
        Self {
            id,
            radius: radius.max(0.0),
            offset: Vec3::ZERO,
            faction,
            enabled: true,
        }
    }
}

impl Hitbox {
    pub fn new(id: HitboxId, radius: f32, damage: f32, damage_type: DamageType) -> Self {
        Self {
            id,
            radius: radius.max(0.0),
            offset: Vec3::ZERO,
            damage: damage.max(0.0),
            damage_type,
            source_id: None,
            source_faction: None,
            max_hits: 1,
            hit_count: 0,
            hit_ids: HashSet::new(),
            enabled: true,
        }
    }
}
