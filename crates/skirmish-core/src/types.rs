//! Fundamental geometric and simulation types.
//!
//! World space is right-handed with Y up. Ships and targets move on the
//! XZ plane; Y is only used for visual height and spline arcs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// World-space position component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec3);

/// World-space velocity component (units/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of frames stepped.
    pub frame: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

/// Pose of the player ship for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipPose {
    pub position: Vec3,
    /// Heading around +Y in radians. Yaw 0 faces +Z.
    pub yaw: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    /// Straight-line distance to another position.
    pub fn range_to(&self, other: &Position) -> f32 {
        self.0.distance(other.0)
    }

    /// Distance on the XZ plane (Y ignored).
    pub fn horizontal_range_to(&self, other: &Position) -> f32 {
        horizontal_distance(self.0, other.0)
    }
}

impl Velocity {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn speed(&self) -> f32 {
        self.0.length()
    }
}

impl SimTime {
    /// Advance by one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.frame += 1;
        self.elapsed_secs += f64::from(dt);
    }
}

impl ShipPose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Unit forward vector on the XZ plane.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Transform a ship-local offset into world space (yaw only).
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        let rotated = Vec3::new(
            local.x * cos + local.z * sin,
            local.y,
            -local.x * sin + local.z * cos,
        );
        self.position + rotated
    }
}

/// Squared distance on the XZ plane.
pub fn horizontal_distance_sq(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    dx * dx + dz * dz
}

/// Distance on the XZ plane.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    horizontal_distance_sq(a, b).sqrt()
}
