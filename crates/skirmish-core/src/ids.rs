//! Entity identifiers and the allocator that hands them out.
//!
//! Ids are allocated by whoever owns the simulation context (engine or
//! controller). Two independent simulations never share a counter.

use serde::{Deserialize, Serialize};

/// Identifier of a damageable volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HurtboxId(pub u32);

/// Identifier of a damage-dealing volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HitboxId(pub u32);

/// Identifier of an in-flight missile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissileId(pub u32);

/// Monotonic id source owned by a simulation context.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }

    pub fn next_hurtbox(&mut self) -> HurtboxId {
        HurtboxId(self.bump())
    }

    /// For callers that own their own `Hitbox` volumes (melee swings,
    /// projectiles). Missiles deal damage through their warhead instead.
    pub fn next_hitbox(&mut self) -> HitboxId {
        HitboxId(self.bump())
    }

    pub fn next_missile(&mut self) -> MissileId {
        MissileId(self.bump())
    }
}

impl std::fmt::Display for HurtboxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hurtbox-{}", self.0)
    }
}

impl std::fmt::Display for MissileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missile-{}", self.0)
    }
}
