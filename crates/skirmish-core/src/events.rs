//! Damage records and combat events emitted by the simulation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{DamageType, DetonationCause, Faction};
use crate::ids::{HitboxId, HurtboxId, MissileId};
use crate::state::HealthSnapshot;

/// One hit's worth of damage. Created per hit and consumed immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamagePacket {
    pub amount: f32,
    pub damage_type: DamageType,
    pub source_id: Option<u32>,
    pub source_faction: Option<Faction>,
}

/// Result of applying one packet to a layered health pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageBreakdown {
    pub incoming_base_damage: f32,
    pub damage_type: DamageType,
    pub to_shield: f32,
    pub to_armor: f32,
    pub to_hull: f32,
    /// Base damage left over after every layer had its turn.
    pub unabsorbed_base_damage: f32,
    pub destroyed: bool,
}

/// A resolved hit against one hurtbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitEvent {
    pub hitbox_id: Option<HitboxId>,
    pub hurtbox_id: HurtboxId,
    pub breakdown: DamageBreakdown,
    pub health: HealthSnapshot,
}

/// Events for HUD, audio and effects layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// A volley left the bay.
    MissileLaunched { missiles: u32, launchers: u32 },
    /// A target completed acquisition and gained its first lock stack.
    TargetLocked { hurtbox_id: HurtboxId },
    /// A locked target was dropped (lost, off-screen or destroyed).
    LockLost { hurtbox_id: HurtboxId },
    /// A missile exploded.
    Detonation {
        missile_id: MissileId,
        position: Vec3,
        cause: DetonationCause,
        hits: u32,
    },
    /// A target's hull reached zero.
    TargetDestroyed { hurtbox_id: HurtboxId },
    /// A launcher finished reloading.
    ReloadComplete { launcher: usize },
}

impl DamagePacket {
    pub fn new(amount: f32, damage_type: DamageType) -> Self {
        Self {
            amount,
            damage_type,
            source_id: None,
            source_faction: None,
        }
    }

    pub fn with_source(mut self, source_id: u32, faction: Option<Faction>) -> Self {
        self.source_id = Some(source_id);
        self.source_faction = faction;
        self
    }
}

impl DamageBreakdown {
    /// Breakdown of a hit that changed nothing.
    pub fn none(damage_type: DamageType, destroyed: bool) -> Self {
        Self {
            incoming_base_damage: 0.0,
            damage_type,
            to_shield: 0.0,
            to_armor: 0.0,
            to_hull: 0.0,
            unabsorbed_base_damage: 0.0,
            destroyed,
        }
    }

    /// Layer damage summed across all tiers.
    pub fn total_applied(&self) -> f32 {
        self.to_shield + self.to_armor + self.to_hull
    }
}
