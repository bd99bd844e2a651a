//! Projection setup: world corners to integer corner bounds
//!
//! Runs once per frame (or per cubemap face) in double precision and hands
//! the traverse a purely integer starting state: the eight corner-bound
//! vectors of the scene cube, the index of the corner deepest in view, and
//! the rounded eye position.

use crate::core::types::{DVec3, I64Vec3, I64Vec4};
use crate::core::Camera;
use crate::math::bounds::{CornerBounds, DELTA};
use crate::math::Frustum;
use crate::render::frame::CubeFace;

/// Integer starting state for one traverse
#[derive(Clone, Copy, Debug)]
pub struct FrameSetup {
    /// Corner bounds of the whole scene cube
    pub bounds: CornerBounds,
    /// Corner with the greatest view depth, the behind-camera test pivot
    pub furthest: usize,
    /// Negated camera position, rounded to octree units; its sign bits pick
    /// the nearest child at every octree level
    pub eye: I64Vec3,
}

impl FrameSetup {
    /// Set up a single-screen frame.
    ///
    /// The quadtree square extends the screen to `quad_size` pixels per
    /// side, so the screen occupies its upper-left `width x height` corner;
    /// the quadtree edges on the view plane are scaled accordingly.
    pub fn new(
        camera: &Camera,
        frustum: &Frustum,
        quad_size: u32,
        width: u32,
        height: u32,
        scene_size: i32,
    ) -> Self {
        let horizontal = (frustum.right - frustum.left) * quad_size as f64 / width as f64;
        let vertical = (frustum.bottom - frustum.top) * quad_size as f64 / height as f64;
        let quad_edges = [
            frustum.left / frustum.near,
            (frustum.left + horizontal) / frustum.near,
            (frustum.top + vertical) / frustum.near,
            frustum.top / frustum.near,
        ];

        let mut bounds = [I64Vec4::ZERO; 8];
        let mut furthest = 0usize;
        let mut furthest_z = f64::NEG_INFINITY;
        for (corner, delta) in DELTA.iter().enumerate() {
            let vertex = delta.as_dvec3() * scene_size as f64;
            let v = camera.orientation * (vertex - camera.position);
            bounds[corner] = I64Vec4::new(
                (v.z * quad_edges[0] - v.x) as i64,
                (v.z * quad_edges[1] - v.x) as i64,
                (v.z * quad_edges[2] - v.y) as i64,
                (v.z * quad_edges[3] - v.y) as i64,
            );
            if v.z > furthest_z {
                furthest_z = v.z;
                furthest = corner;
            }
        }

        let eye = (-camera.position).round().as_i64vec3();
        Self {
            bounds,
            furthest,
            eye,
        }
    }

    /// Set up one world-axis-aligned cubemap face. The camera's rotation
    /// does not enter here; it is applied to the clip planes when the
    /// coverage map is built.
    pub fn for_cube_face(
        face: CubeFace,
        position: DVec3,
        quad_size: u32,
        scene_size: i32,
    ) -> Self {
        let camera = Camera {
            position,
            orientation: face.orientation(),
        };
        Self::new(
            &camera,
            &Frustum::cube_face(),
            quad_size,
            quad_size,
            quad_size,
            scene_size,
        )
    }
}
