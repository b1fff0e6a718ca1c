//! Camera projection used for on-screen lock tests.

use glam::{Mat4, Vec3};

use skirmish_core::constants::NDC_LIMIT;
use skirmish_core::types::ShipPose;

/// Anything that can map world points into normalized device coordinates.
pub trait CameraProjection {
    /// NDC of `point`, or `None` when it lies behind the camera.
    fn world_to_ndc(&self, point: Vec3) -> Option<Vec3>;

    /// True when `point` projects inside the view volume.
    fn is_on_screen(&self, point: Vec3) -> bool {
        self.world_to_ndc(point).is_some_and(|ndc| {
            ndc.x.abs() <= NDC_LIMIT && ndc.y.abs() <= NDC_LIMIT && ndc.z.abs() <= NDC_LIMIT
        })
    }
}

/// Right-handed perspective camera with OpenGL depth range.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    pub eye: Vec3,
    view_projection: Mat4,
}

/// Chase camera placement relative to the ship.
const CHASE_BACK: f32 = 40.0;
const CHASE_UP: f32 = 60.0;
const CHASE_LOOK_AHEAD: f32 = 30.0;
const CHASE_FOV_Y_RADIANS: f32 = 70.0 * std::f32::consts::PI / 180.0;

impl PerspectiveCamera {
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        fov_y_radians: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(fov_y_radians, aspect.max(1e-3), near, far);
        Self {
            eye,
            view_projection: projection * view,
        }
    }

    /// Elevated camera behind the ship, looking ahead of it.
    pub fn chase(ship: &ShipPose) -> Self {
        let forward = ship.forward();
        let eye = ship.position - forward * CHASE_BACK + Vec3::Y * CHASE_UP;
        let target = ship.position + forward * CHASE_LOOK_AHEAD;
        Self::look_at(eye, target, CHASE_FOV_Y_RADIANS, 16.0 / 9.0, 0.5, 1000.0)
    }
}

impl CameraProjection for PerspectiveCamera {
    fn world_to_ndc(&self, point: Vec3) -> Option<Vec3> {
        let clip = self.view_projection * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }
}
