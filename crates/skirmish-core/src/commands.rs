//! Player commands sent from the input layer to the arena.
//!
//! Commands are queued and processed at the next frame boundary.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::ShipPose;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Secondary fire pressed (edge, not held).
    FireSecondary,
    /// Move the aim reticle. `None` when there is no aim input.
    SetAimTarget { target: Option<Vec3> },
    /// Update the ship pose for the coming frames.
    SetShipPose { pose: ShipPose },
    /// Arm or disarm the missile bay.
    SetEnabled { enabled: bool },
    /// Swap every launcher to the given catalog payload.
    SelectPayload { payload_id: String },
}
