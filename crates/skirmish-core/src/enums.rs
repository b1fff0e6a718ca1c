//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Damage category. Known types are closed; data-driven payloads can
/// introduce their own through `Custom`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Kinetic,
    Thermal,
    Explosive,
    Em,
    Custom(String),
}

impl DamageType {
    /// All built-in damage types.
    pub const BUILTIN: [DamageType; 4] = [
        DamageType::Kinetic,
        DamageType::Thermal,
        DamageType::Explosive,
        DamageType::Em,
    ];

    /// Stable lowercase key, used in logs and data files.
    pub fn key(&self) -> &str {
        match self {
            DamageType::Kinetic => "kinetic",
            DamageType::Thermal => "thermal",
            DamageType::Explosive => "explosive",
            DamageType::Em => "em",
            DamageType::Custom(key) => key.as_str(),
        }
    }
}

/// Health absorption tier, in the order damage reaches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthLayer {
    Shield,
    Armor,
    Hull,
}

impl HealthLayer {
    /// Absorption order: shield first, hull last.
    pub const ALL: [HealthLayer; 3] = [HealthLayer::Shield, HealthLayer::Armor, HealthLayer::Hull];
}

/// Team affiliation for friendly-fire checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Player,
    Enemy,
    Neutral,
}

/// How a launcher group gets its rounds back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadMode {
    /// One round returns every `reload_secs`.
    #[default]
    PerRound,
    /// The whole group refills at once, `reload_secs` after running dry.
    FullMagazine,
}

/// Missile guidance mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightMode {
    /// Unguided boost, then rate-limited pursuit of the assigned target.
    #[default]
    Homing,
    /// Scripted cubic Bezier path to a predicted point.
    Spline,
}

/// Visual model selector for a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissileModel {
    #[default]
    Standard,
    Swarm,
}

/// Why a missile detonated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetonationCause {
    /// A damageable hurtbox entered the fuse radius.
    Proximity,
    /// The spline path reached its destination.
    PathComplete,
    /// Flight time ran out.
    LifetimeExpired,
}
