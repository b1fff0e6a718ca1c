//! Damage-type multiplier tables.
//!
//! Lookup order for a (type, layer) pair: the exact per-type entry, then
//! the default entry for that layer, then 1.0.

use serde::{Deserialize, Serialize};

use skirmish_core::enums::{DamageType, HealthLayer};

/// Optional multiplier per layer. `None` defers to the next lookup tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerMultipliers {
    pub shield: Option<f32>,
    pub armor: Option<f32>,
    pub hull: Option<f32>,
}

/// Multipliers for one damage type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMultipliers {
    pub damage_type: DamageType,
    #[serde(flatten)]
    pub layers: LayerMultipliers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageMultipliers {
    /// Fallback used when a type has no entry for a layer.
    pub default: LayerMultipliers,
    pub per_type: Vec<TypeMultipliers>,
}

impl LayerMultipliers {
    pub fn get(&self, layer: HealthLayer) -> Option<f32> {
        match layer {
            HealthLayer::Shield => self.shield,
            HealthLayer::Armor => self.armor,
            HealthLayer::Hull => self.hull,
        }
    }

    pub fn set(&mut self, layer: HealthLayer, value: f32) {
        let slot = match layer {
            HealthLayer::Shield => &mut self.shield,
            HealthLayer::Armor => &mut self.armor,
            HealthLayer::Hull => &mut self.hull,
        };
        *slot = Some(value);
    }
}

impl DamageMultipliers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the multiplier for one type and layer.
    pub fn with(mut self, damage_type: DamageType, layer: HealthLayer, value: f32) -> Self {
        self.set(damage_type, layer, value);
        self
    }

    /// Builder: set the fallback multiplier for one layer.
    pub fn with_default(mut self, layer: HealthLayer, value: f32) -> Self {
        self.default.set(layer, value);
        self
    }

    pub fn set(&mut self, damage_type: DamageType, layer: HealthLayer, value: f32) {
        match self.per_type.iter_mut().find(|e| e.damage_type == damage_type) {
            Some(entry) => entry.layers.set(layer, value),
            None => {
                let mut layers = LayerMultipliers::default();
                layers.set(layer, value);
                self.per_type.push(TypeMultipliers {
                    damage_type,
                    layers,
                });
            }
        }
    }

    /// Effective multiplier, clamped to `>= 0`.
    pub fn lookup(&self, damage_type: &DamageType, layer: HealthLayer) -> f32 {
        let exact = self
            .per_type
            .iter()
            .find(|e| &e.damage_type == damage_type)
            .and_then(|e| e.layers.get(layer));
        let value = exact.or_else(|| self.default.get(layer)).unwrap_or(1.0);
        if value.is_nan() {
            0.0
        } else {
            value.max(0.0)
        }
    }
}
