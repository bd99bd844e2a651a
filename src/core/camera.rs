//! Camera for octree rendering

use crate::core::types::{DMat3, DVec3};

/// Camera with double-precision position and view orientation.
///
/// `orientation` maps world vectors into view space and is orthonormal, so
/// its transpose is its inverse. View space is x-right, y-down, z-forward
/// to match the screen convention of the projection (y grows downward).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World position in octree units
    pub position: DVec3,
    /// World-to-view rotation
    pub orientation: DMat3,
}

impl Camera {
    /// Create a camera at `position` looking down the world +z axis
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            orientation: DMat3::IDENTITY,
        }
    }

    /// Create a camera looking at a target.
    ///
    /// `up` is the world-space up direction; it must not be parallel to the
    /// view direction.
    pub fn look_at(position: DVec3, target: DVec3, up: DVec3) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(-up).normalize();
        let down = right.cross(forward);

        // Rows of the world-to-view matrix are the view basis vectors.
        let orientation = DMat3::from_cols(right, down, forward).transpose();

        Self { position, orientation }
    }

    /// View-to-world rotation
    pub fn inverse_orientation(&self) -> DMat3 {
        self.orientation.transpose()
    }

    /// Get forward direction in world space
    pub fn forward(&self) -> DVec3 {
        self.orientation.transpose() * DVec3::Z
    }

    /// Get right direction in world space
    pub fn right(&self) -> DVec3 {
        self.orientation.transpose() * DVec3::X
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DVec3::ZERO)
    }
}
