//! Shield / armor / hull health pool.
//!
//! Every input is clamped rather than rejected: negative amounts and rates
//! become zero, efficiency is forced into [0, 1].

use serde::{Deserialize, Serialize};

use skirmish_core::constants::DAMAGE_EPSILON;
use skirmish_core::enums::{DamageType, HealthLayer};
use skirmish_core::events::DamageBreakdown;
use skirmish_core::state::{HealthSnapshot, LayerView};

use crate::multipliers::DamageMultipliers;

/// Tunables for a health pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub shield_max: f32,
    pub armor_max: f32,
    pub hull_max: f32,
    /// Shield points regained per second once the recharge delay has elapsed.
    pub shield_charge_rate: f32,
    /// Seconds after any hit before the shield starts recharging.
    pub shield_recharge_delay_secs: f32,
    pub hull_repair_rate: f32,
    pub armor_repair_rate: f32,
    /// Fraction of armor damage taken that may ever be repaired.
    pub armor_repair_efficiency: f32,
    pub multipliers: DamageMultipliers,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            shield_max: 0.0,
            armor_max: 0.0,
            hull_max: 100.0,
            shield_charge_rate: 0.0,
            shield_recharge_delay_secs: 0.0,
            hull_repair_rate: 0.0,
            armor_repair_rate: 0.0,
            armor_repair_efficiency: 1.0,
            multipliers: DamageMultipliers::default(),
        }
    }
}

/// Current and maximum value of one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerHealth {
    pub current: f32,
    pub max: f32,
}

impl LayerHealth {
    fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn missing(&self) -> f32 {
        (self.max - self.current).max(0.0)
    }

    fn view(&self) -> LayerView {
        LayerView {
            current: self.current,
            max: self.max,
        }
    }
}

/// Layered health of one damageable entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthComponent {
    shield: LayerHealth,
    armor: LayerHealth,
    hull: LayerHealth,
    shield_charge_rate: f32,
    shield_recharge_delay_secs: f32,
    shield_recharge_delay_remaining: f32,
    hull_repair_rate: f32,
    armor_repair_rate: f32,
    armor_repair_efficiency: f32,
    /// Cumulative armor damage, never reduced by repairs.
    armor_damage_taken: f32,
    /// Cumulative armor repaired.
    armor_repair_applied: f32,
    multipliers: DamageMultipliers,
}

fn clamp_non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

impl HealthComponent {
    /// Create a pool with every layer full.
    pub fn new(config: HealthConfig) -> Self {
        let efficiency = if config.armor_repair_efficiency.is_nan() {
            0.0
        } else {
            config.armor_repair_efficiency.clamp(0.0, 1.0)
        };
        Self {
            shield: LayerHealth::full(clamp_non_negative(config.shield_max)),
            armor: LayerHealth::full(clamp_non_negative(config.armor_max)),
            hull: LayerHealth::full(clamp_non_negative(config.hull_max)),
            shield_charge_rate: clamp_non_negative(config.shield_charge_rate),
            shield_recharge_delay_secs: clamp_non_negative(config.shield_recharge_delay_secs),
            shield_recharge_delay_remaining: 0.0,
            hull_repair_rate: clamp_non_negative(config.hull_repair_rate),
            armor_repair_rate: clamp_non_negative(config.armor_repair_rate),
            armor_repair_efficiency: efficiency,
            armor_damage_taken: 0.0,
            armor_repair_applied: 0.0,
            multipliers: config.multipliers,
        }
    }

    pub fn shield(&self) -> LayerHealth {
        self.shield
    }

    pub fn armor(&self) -> LayerHealth {
        self.armor
    }

    pub fn hull(&self) -> LayerHealth {
        self.hull
    }

    pub fn layer(&self, layer: HealthLayer) -> LayerHealth {
        match layer {
            HealthLayer::Shield => self.shield,
            HealthLayer::Armor => self.armor,
            HealthLayer::Hull => self.hull,
        }
    }

    fn layer_mut(&mut self, layer: HealthLayer) -> &mut LayerHealth {
        match layer {
            HealthLayer::Shield => &mut self.shield,
            HealthLayer::Armor => &mut self.armor,
            HealthLayer::Hull => &mut self.hull,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hull.current <= 0.0
    }

    pub fn shield_recharge_delay_remaining(&self) -> f32 {
        self.shield_recharge_delay_remaining
    }

    pub fn armor_damage_taken(&self) -> f32 {
        self.armor_damage_taken
    }

    pub fn armor_repair_applied(&self) -> f32 {
        self.armor_repair_applied
    }

    /// Armor that may still be repaired given damage absorbed so far.
    pub fn remaining_armor_repair_budget(&self) -> f32 {
        (self.armor_damage_taken * self.armor_repair_efficiency - self.armor_repair_applied)
            .max(0.0)
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            shield: self.shield.view(),
            armor: self.armor.view(),
            hull: self.hull.view(),
            destroyed: self.is_destroyed(),
        }
    }

    /// Absorb `amount` base damage through shield, armor and hull.
    ///
    /// A layer's multiplier scales base damage into layer damage; the base
    /// damage it consumes is the layer damage divided back by the multiplier.
    /// A zero multiplier lets everything through untouched.
    pub fn apply_damage(&mut self, amount: f32, damage_type: &DamageType) -> DamageBreakdown {
        let amount = clamp_non_negative(amount);
        let mut breakdown = DamageBreakdown::none(damage_type.clone(), self.is_destroyed());
        if amount <= 0.0 {
            return breakdown;
        }
        breakdown.incoming_base_damage = amount;

        let mut remaining = amount;
        for layer in HealthLayer::ALL {
            if remaining <= DAMAGE_EPSILON {
                remaining = 0.0;
                break;
            }
            let multiplier = self.multipliers.lookup(damage_type, layer);
            if multiplier <= 0.0 {
                continue;
            }
            let pool = self.layer_mut(layer);
            let dealt = pool.current.min(remaining * multiplier);
            if dealt <= 0.0 {
                continue;
            }
            pool.current = (pool.current - dealt).max(0.0);
            remaining = (remaining - dealt / multiplier).max(0.0);

            match layer {
                HealthLayer::Shield => breakdown.to_shield = dealt,
                HealthLayer::Armor => breakdown.to_armor = dealt,
                HealthLayer::Hull => breakdown.to_hull = dealt,
            }
        }
        if remaining <= DAMAGE_EPSILON {
            remaining = 0.0;
        }

        self.armor_damage_taken += breakdown.to_armor;
        // Any hit interrupts shield regen, whether or not the shield took it
        if self.shield_recharge_delay_secs > 0.0 {
            self.shield_recharge_delay_remaining = self.shield_recharge_delay_secs;
        }

        breakdown.unabsorbed_base_damage = remaining;
        breakdown.destroyed = self.is_destroyed();
        breakdown
    }

    /// Restore shield, clamped to missing capacity. Returns the amount restored.
    pub fn repair_shield(&mut self, amount: f32) -> f32 {
        if self.is_destroyed() {
            return 0.0;
        }
        let applied = clamp_non_negative(amount).min(self.shield.missing());
        self.shield.current += applied;
        applied
    }

    /// Restore hull, clamped to missing capacity. Returns the amount restored.
    pub fn repair_hull(&mut self, amount: f32) -> f32 {
        if self.is_destroyed() {
            return 0.0;
        }
        let applied = clamp_non_negative(amount).min(self.hull.missing());
        self.hull.current += applied;
        applied
    }

    /// Restore armor within the repair budget. Returns the amount restored.
    pub fn repair_armor(&mut self, amount: f32) -> f32 {
        if self.is_destroyed() {
            return 0.0;
        }
        let applied = clamp_non_negative(amount)
            .min(self.armor.missing())
            .min(self.remaining_armor_repair_budget());
        if applied <= 0.0 {
            return 0.0;
        }
        self.armor.current += applied;
        self.armor_repair_applied += applied;
        applied
    }

    /// Advance regeneration by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 || self.is_destroyed() {
            return;
        }

        if self.shield_recharge_delay_remaining > 0.0 {
            self.shield_recharge_delay_remaining =
                (self.shield_recharge_delay_remaining - dt).max(0.0);
        }
        if self.shield_recharge_delay_remaining <= 0.0 && self.shield_charge_rate > 0.0 {
            self.repair_shield(self.shield_charge_rate * dt);
        }

        if self.hull_repair_rate > 0.0 {
            self.repair_hull(self.hull_repair_rate * dt);
        }
        if self.armor_repair_rate > 0.0 {
            self.repair_armor(self.armor_repair_rate * dt);
        }
    }

    /// Refill every layer and forget all cumulative counters.
    pub fn reset(&mut self) {
        self.shield.current = self.shield.max;
        self.armor.current = self.armor.max;
        self.hull.current = self.hull.max;
        self.shield_recharge_delay_remaining = 0.0;
        self.armor_damage_taken = 0.0;
        self.armor_repair_applied = 0.0;
    }
}
