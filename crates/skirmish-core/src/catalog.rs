//! Missile bay payload definitions and the catalog that indexes them.
//!
//! Definitions are plain data loaded from JSON or taken from the builtin
//! set. Out-of-range numbers are clamped by `sanitized`, never rejected.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::enums::{DamageType, FlightMode, MissileModel, ReloadMode};

/// Builtin homing rack id.
pub const MISSILE_RACK_ID: &str = "missile_rack";

/// Builtin spline swarm pod id.
pub const SWARM_POD_ID: &str = "swarm_pod";

/// Static definition of a missile bay payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileBayComponentDefinition {
    pub id: String,
    pub display_name: String,

    // --- Warhead ---
    pub damage: f32,
    pub damage_type: DamageType,
    /// Flat-damage blast radius around the detonation point.
    pub explosion_radius: f32,
    /// Proximity fuse radius.
    pub fuse_radius: f32,

    // --- Flight ---
    pub flight_mode: FlightMode,
    pub speed: f32,
    pub lifetime_secs: f32,
    /// Scales the random control-point offsets of spline paths.
    pub spline_wildness: f32,
    /// Multiplier on travel time when leading a moving target.
    pub predictive_lead_factor: f32,
    /// Random spread around the reticle point for unlocked spline shots.
    pub aim_scatter_radius: f32,

    // --- Launcher ---
    pub reload_secs: f32,
    pub reload_mode: ReloadMode,
    /// Minimum time between accepted trigger presses.
    pub trigger_interval_secs: f32,
    /// Minimum time between queued volleys leaving the bay.
    pub burst_interval_secs: f32,
    pub missiles_per_shot: u32,

    // --- Locking ---
    pub use_lock_stacks: bool,
    pub acquire_secs: f32,
    /// Time for a full lock progress bar to drain once decay starts.
    pub progress_decay_secs: f32,
    /// Grace period after the reticle leaves a target before progress decays.
    pub progress_decay_delay_secs: f32,
    pub max_locks_per_target: u32,
    /// Global stack budget. Zero derives it from the volley size.
    pub max_lock_stacks_total: u32,
    /// Added to a target's radius when testing reticle hover.
    pub reticle_radius_padding: f32,

    pub model: MissileModel,
}

impl Default for MissileBayComponentDefinition {
    fn default() -> Self {
        Self {
            id: MISSILE_RACK_ID.to_string(),
            display_name: "Missile Rack".to_string(),
            damage: 40.0,
            damage_type: DamageType::Explosive,
            explosion_radius: 4.0,
            fuse_radius: 1.25,
            flight_mode: FlightMode::Homing,
            speed: 38.0,
            lifetime_secs: 6.0,
            spline_wildness: 0.0,
            predictive_lead_factor: 1.0,
            aim_scatter_radius: 0.0,
            reload_secs: 1.6,
            reload_mode: ReloadMode::PerRound,
            trigger_interval_secs: 0.25,
            burst_interval_secs: 0.12,
            missiles_per_shot: 1,
            use_lock_stacks: false,
            acquire_secs: 0.6,
            progress_decay_secs: 1.2,
            progress_decay_delay_secs: 0.4,
            max_locks_per_target: 1,
            max_lock_stacks_total: 4,
            reticle_radius_padding: 1.5,
            model: MissileModel::Standard,
        }
    }
}

impl MissileBayComponentDefinition {
    /// Builtin spline swarm payload: many light missiles spread over lock stacks.
    pub fn swarm_pod() -> Self {
        Self {
            id: SWARM_POD_ID.to_string(),
            display_name: "Swarm Pod".to_string(),
            damage: 14.0,
            explosion_radius: 2.5,
            fuse_radius: 1.0,
            flight_mode: FlightMode::Spline,
            speed: 46.0,
            lifetime_secs: 4.0,
            spline_wildness: 1.0,
            predictive_lead_factor: 1.0,
            aim_scatter_radius: 3.0,
            reload_secs: 3.5,
            reload_mode: ReloadMode::FullMagazine,
            trigger_interval_secs: 0.35,
            burst_interval_secs: 0.08,
            missiles_per_shot: 3,
            use_lock_stacks: true,
            acquire_secs: 0.35,
            progress_decay_secs: 1.0,
            progress_decay_delay_secs: 0.5,
            max_locks_per_target: 6,
            max_lock_stacks_total: 0,
            reticle_radius_padding: 2.0,
            model: MissileModel::Swarm,
            ..Self::default()
        }
    }

    /// Copy with every numeric field clamped to its valid range.
    pub fn sanitized(&self) -> Self {
        Self {
            damage: non_negative(self.damage),
            explosion_radius: non_negative(self.explosion_radius),
            fuse_radius: non_negative(self.fuse_radius),
            speed: non_negative(self.speed),
            lifetime_secs: non_negative(self.lifetime_secs),
            spline_wildness: non_negative(self.spline_wildness),
            predictive_lead_factor: non_negative(self.predictive_lead_factor),
            aim_scatter_radius: non_negative(self.aim_scatter_radius),
            reload_secs: non_negative(self.reload_secs),
            trigger_interval_secs: non_negative(self.trigger_interval_secs),
            burst_interval_secs: non_negative(self.burst_interval_secs),
            missiles_per_shot: self.missiles_per_shot.max(1),
            acquire_secs: non_negative(self.acquire_secs),
            progress_decay_secs: non_negative(self.progress_decay_secs),
            progress_decay_delay_secs: non_negative(self.progress_decay_delay_secs),
            max_locks_per_target: self.max_locks_per_target.max(1),
            reticle_radius_padding: non_negative(self.reticle_radius_padding),
            ..self.clone()
        }
    }
}

/// Clamp to `>= 0`, mapping NaN to 0.
fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Payload definitions indexed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponComponentCatalog {
    definitions: BTreeMap<String, MissileBayComponentDefinition>,
}

impl WeaponComponentCatalog {
    /// Catalog with the stock payloads.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        catalog.insert(MissileBayComponentDefinition::default());
        catalog.insert(MissileBayComponentDefinition::swarm_pod());
        catalog
    }

    /// Parse a catalog from a JSON array of definitions.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let definitions: Vec<MissileBayComponentDefinition> = serde_json::from_str(json)?;
        let mut catalog = Self::default();
        for definition in definitions {
            catalog.insert(definition);
        }
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Insert or replace a definition under its own id.
    pub fn insert(&mut self, definition: MissileBayComponentDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> Option<&MissileBayComponentDefinition> {
        self.definitions.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
