//! View frustum for projection setup and cubemap face clipping

use crate::core::types::DVec3;
use serde::{Deserialize, Serialize};

/// View frustum as five scalars in view-plane units.
///
/// The visible region on the plane `z = near` is `left..right` horizontally
/// and `top..bottom` vertically, with y growing downward on screen, so
/// `left < right` and `top < bottom`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Frustum {
    pub near: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Frustum {
    /// Symmetric frustum for a given aspect ratio (width / height)
    pub fn symmetric(aspect: f64) -> Self {
        Self {
            near: 1.0,
            left: -1.0,
            right: 1.0,
            top: -1.0 / aspect,
            bottom: 1.0 / aspect,
        }
    }

    /// The 90-degree frustum of one cubemap face: the full face square at
    /// unit distance.
    pub fn cube_face() -> Self {
        Self {
            near: 1.0,
            left: -1.0,
            right: 1.0,
            top: -1.0,
            bottom: 1.0,
        }
    }

    /// Inward normals of the four side planes of the view pyramid, in view
    /// space. A direction is inside the pyramid iff its dot product with all
    /// four normals is non-negative.
    pub fn view_planes(&self) -> [DVec3; 4] {
        [
            DVec3::new(self.near, 0.0, -self.left),
            DVec3::new(-self.near, 0.0, self.right),
            DVec3::new(0.0, self.near, -self.top),
            DVec3::new(0.0, -self.near, self.bottom),
        ]
    }
}

impl Default for Frustum {
    /// 4:3 frustum at unit near distance
    fn default() -> Self {
        Self::symmetric(4.0 / 3.0)
    }
}
