//! Read-only snapshots for the HUD and for tests.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ids::HurtboxId;
use crate::types::SimTime;

/// Current and maximum value of one health layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerView {
    pub current: f32,
    pub max: f32,
}

/// Health of one entity at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub shield: LayerView,
    pub armor: LayerView,
    pub hull: LayerView,
    pub destroyed: bool,
}

/// Missile bay status, polled once per frame by the HUD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissileBayStatus {
    pub enabled: bool,
    /// Total cells across all launchers.
    pub capacity: u32,
    /// Rounds currently loaded across all launchers.
    pub loaded: u32,
    pub launcher_loaded: Vec<u32>,
    pub launcher_capacity: Vec<u32>,
    pub launcher_reloading: Vec<bool>,
    /// Largest fractional progress among reloading launchers.
    pub reload_progress01: f32,
    /// Remaining time of the post-volley HUD flash.
    pub fired_flash_secs: f32,
    pub locked_target_count: u32,
    pub lock_stacks_total: u32,
    pub is_locking: bool,
    pub locking_progress01: f32,
    pub queued_shots: u32,
    pub active_missiles: u32,
}

/// Lock marker for one tracked target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LockIndicatorView {
    pub hurtbox_id: HurtboxId,
    pub world_center: Vec3,
    pub locked: bool,
    pub lock_stacks: u32,
    /// Progress toward the next stack, 0..1.
    pub progress01: f32,
}

/// Explosion flash still fading out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionFlashView {
    pub position: Vec3,
    pub radius: f32,
    /// 1 when spawned, 0 when gone.
    pub intensity01: f32,
}

/// Target as seen by the HUD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetView {
    pub hurtbox_id: HurtboxId,
    pub position: Vec3,
    pub radius: f32,
    pub enabled: bool,
    pub health: HealthSnapshot,
}

/// Complete arena state after a frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub time: SimTime,
    pub bay: MissileBayStatus,
    pub targets: Vec<TargetView>,
    pub locks: Vec<LockIndicatorView>,
    pub missiles: Vec<Vec3>,
    pub explosions: Vec<ExplosionFlashView>,
    pub events: Vec<crate::events::CombatEvent>,
}
