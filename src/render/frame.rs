//! Face drivers: single-screen and cubemap rendering
//!
//! The cubemap is world-axis aligned: each face projects through a fixed
//! axis permutation and the camera's rotation only decides which tiles of
//! each face are in view, so turning the camera re-clips faces instead of
//! re-projecting the scene.

use std::time::Instant;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::types::{DMat3, DVec3, Result};
use crate::core::{Camera, Error};
use crate::math::Frustum;
use crate::octree::OctreeStore;
use crate::render::coverage::{CoverageMap, MAX_DEPTH};
use crate::render::project::FrameSetup;
use crate::render::traverse::Traverser;

/// Renderer configuration, validated before any frame is started
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Screen width in pixels
    pub width: u32,
    /// Screen height in pixels
    pub height: u32,
    /// Coverage quadtree depth; the quadtree square has `2^quad_depth`
    /// pixels per side and must cover the screen
    pub quad_depth: u32,
    /// Octree depth of the scene, 1..=30; the scene cube spans
    /// `+-2^scene_depth` octree units. The whole range is safe: corner
    /// bounds carry 64-bit lanes.
    pub scene_depth: u32,
    /// View frustum for single-screen rendering
    pub frustum: Frustum,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            quad_depth: 10,
            scene_depth: 26,
            frustum: Frustum::default(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config("screen dimensions must be positive".into()));
        }
        if self.quad_depth < 1 || self.quad_depth > MAX_DEPTH {
            return Err(Error::Config(format!(
                "quadtree depth {} outside 1..={}",
                self.quad_depth, MAX_DEPTH
            )));
        }
        let quad_size = 1u32 << self.quad_depth;
        if quad_size < self.width.max(self.height) {
            return Err(Error::Config(format!(
                "quadtree side {} cannot cover a {}x{} screen",
                quad_size, self.width, self.height
            )));
        }
        if self.scene_depth < 1 || self.scene_depth > 30 {
            return Err(Error::Config(format!(
                "scene depth {} outside 1..=30",
                self.scene_depth
            )));
        }
        if self.frustum.near <= 0.0 {
            return Err(Error::Config("near plane must be positive".into()));
        }
        if self.frustum.left >= self.frustum.right || self.frustum.top >= self.frustum.bottom {
            return Err(Error::Config("degenerate frustum rectangle".into()));
        }
        Ok(())
    }
}

/// The six cubemap faces in render order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PosY,
    PosZ,
    PosX,
    NegZ,
    NegX,
    NegY,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosY,
        CubeFace::PosZ,
        CubeFace::PosX,
        CubeFace::NegZ,
        CubeFace::NegX,
        CubeFace::NegY,
    ];

    /// Rotate a world-space vector into this face's view space (face looks
    /// along +z with y down on the face image)
    pub fn rotate(self, v: DVec3) -> DVec3 {
        match self {
            CubeFace::PosY => DVec3::new(v.x, -v.z, v.y),
            CubeFace::PosZ => v,
            CubeFace::PosX => DVec3::new(-v.z, v.y, v.x),
            CubeFace::NegZ => DVec3::new(-v.x, v.y, -v.z),
            CubeFace::NegX => DVec3::new(v.z, v.y, -v.x),
            CubeFace::NegY => DVec3::new(v.x, v.z, -v.y),
        }
    }

    /// The same rotation as a matrix
    pub fn orientation(self) -> DMat3 {
        DMat3::from_cols(
            self.rotate(DVec3::X),
            self.rotate(DVec3::Y),
            self.rotate(DVec3::Z),
        )
    }
}

/// Receives finished face images. Stands between the renderer and whatever
/// uploads or stores the pixels.
pub trait Presenter {
    /// `pixels` is a row-major `size * size` BGRA8 image
    fn present(&mut self, face: CubeFace, pixels: &[u32], size: u32);
}

/// Owns the coverage map and drives traversals over a borrowed octree arena
pub struct Renderer {
    config: RenderConfig,
    face: CoverageMap,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let face = CoverageMap::new(config.quad_depth);
        Ok(Self { config, face })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Coverage map of the most recent frame
    pub fn coverage(&self) -> &CoverageMap {
        &self.face
    }

    /// Render a single screen and return the painted pixels (row-major
    /// BGRA8, quadtree-sized; the screen occupies the upper-left
    /// `width x height` corner).
    pub fn render(&mut self, store: &OctreeStore, camera: &Camera) -> &[u32] {
        let start = Instant::now();
        self.face.build_screen(self.config.width, self.config.height);
        let setup = FrameSetup::new(
            camera,
            &self.config.frustum,
            self.face.size(),
            self.config.width,
            self.config.height,
            1 << self.config.scene_depth,
        );
        let mut traverser = Traverser::new(store, &mut self.face);
        let stats = traverser.run(&setup, self.config.scene_depth);
        debug!(
            "frame: {} painted, {} octree steps, {} quad steps, {} culled, {:.2}ms",
            stats.leaves_painted,
            stats.octree_steps,
            stats.quadtree_steps,
            stats.culled,
            start.elapsed().as_secs_f64() * 1e3,
        );
        self.face.pixels()
    }

    /// Render all six cubemap faces around the camera position, handing each
    /// face the camera's view direction reaches to the presenter. Faces
    /// entirely outside the view frustum are skipped.
    pub fn render_cubemap(
        &mut self,
        store: &OctreeStore,
        camera: &Camera,
        presenter: &mut dyn Presenter,
    ) {
        let start = Instant::now();

        // View-pyramid plane normals in world space; the orientation is
        // orthonormal so the transpose takes them out of view space.
        let inverse = camera.inverse_orientation();
        let world_planes = self.config.frustum.view_planes().map(|n| inverse * n);

        let mut rendered = 0u32;
        for face in CubeFace::ALL {
            let face_planes = world_planes.map(|n| face.rotate(n));
            self.face.build_cubemap(&face_planes);
            if !self.face.in_view(0) {
                continue;
            }

            let setup = FrameSetup::for_cube_face(
                face,
                camera.position,
                self.face.size(),
                1 << self.config.scene_depth,
            );
            let mut traverser = Traverser::new(store, &mut self.face);
            let stats = traverser.run(&setup, self.config.scene_depth);
            debug!(
                "face {:?}: {} painted, {} octree steps, {} culled",
                face, stats.leaves_painted, stats.octree_steps, stats.culled
            );

            presenter.present(face, self.face.pixels(), self.face.size());
            rendered += 1;
        }
        debug!(
            "cubemap: {}/6 faces in {:.2}ms",
            rendered,
            start.elapsed().as_secs_f64() * 1e3,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::octree::node::SOLID;
    use crate::octree::{rgb_to_bgra, Node, OctreeBuilder};
    use crate::render::coverage::CLEAR_COLOR;

    const RED: u32 = 0xff0000;

    fn small_config(quad_depth: u32, scene_depth: u32) -> RenderConfig {
        let size = 1 << quad_depth;
        RenderConfig {
            width: size,
            height: size,
            quad_depth,
            scene_depth,
            frustum: Frustum::cube_face(),
        }
    }

    /// A tree whose root has eight solid children of one color
    fn homogeneous_store(color: u32) -> OctreeStore {
        let root = Node {
            child: [SOLID; 8],
            avgcolor: [color as i32; 8],
        };
        OctreeStore::from_nodes(vec![root]).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());

        let mut bad = small_config(2, 3);
        bad.width = 5; // quadtree side 4 cannot cover it
        assert!(matches!(bad.validate(), Err(Error::Config(_))));

        let mut bad = small_config(2, 3);
        bad.scene_depth = 31;
        assert!(matches!(bad.validate(), Err(Error::Config(_))));

        let mut bad = small_config(2, 3);
        bad.frustum.right = bad.frustum.left;
        assert!(matches!(bad.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_single_voxel_paints_center() {
        // 4x4 screen, scene of depth 3, one voxel just ahead of the scene
        // center, camera three scene sizes back: the voxel lands in the
        // central pixels and nowhere else.
        let mut builder = OctreeBuilder::new(3);
        builder.insert(4, 4, 4, RED);
        let store = builder.build().unwrap();

        let mut renderer = Renderer::new(small_config(2, 3)).unwrap();
        let camera = Camera::new(DVec3::new(0.0, 0.0, -24.0));
        renderer.render(&store, &camera);

        for y in 0..4 {
            for x in 0..4 {
                let p = renderer.coverage().pixel(x, y);
                let central = (1..=2).contains(&x) && (1..=2).contains(&y);
                if central {
                    assert!(
                        p == RED || p == CLEAR_COLOR,
                        "unexpected color {:08x} at {},{}",
                        p,
                        x,
                        y
                    );
                } else {
                    assert_eq!(p, CLEAR_COLOR, "stray paint at {},{}", x, y);
                }
            }
        }
        let painted = renderer
            .coverage()
            .pixels()
            .iter()
            .filter(|&&p| p == RED)
            .count();
        assert!(painted >= 1 && painted <= 4, "painted {}", painted);
    }

    #[test]
    fn test_homogeneous_scene_fills_screen() {
        let store = homogeneous_store(RED);
        let mut renderer = Renderer::new(small_config(3, 4)).unwrap();
        let camera = Camera::new(DVec3::new(0.0, 0.0, 0.0));
        let pixels = renderer.render(&store, &camera).to_vec();

        assert!(pixels.iter().all(|&p| p == RED));
        assert!(renderer.coverage().is_fully_painted());
    }

    #[test]
    fn test_deepest_scene_depth_renders() {
        // scene_depth 30 is the top of the validated range; at that size the
        // root projection alone exceeds i32, so this exercises the 64-bit
        // bounds lanes end to end.
        let store = homogeneous_store(RED);
        let mut renderer = Renderer::new(small_config(3, 30)).unwrap();
        let camera = Camera::new(DVec3::new(0.0, 0.0, 0.0));
        let pixels = renderer.render(&store, &camera).to_vec();

        assert!(pixels.iter().all(|&p| p == RED));
        assert!(renderer.coverage().is_fully_painted());
    }

    #[test]
    fn test_camera_inside_solid_block() {
        // Solid block filling one octant, camera inside it
        let mut builder = OctreeBuilder::new(4);
        builder.insert_at(1, 1, 1, 1, 0x2288aa);
        let store = builder.build().unwrap();

        let mut renderer = Renderer::new(small_config(3, 4)).unwrap();
        let camera = Camera::new(DVec3::new(8.0, 8.0, 8.0));
        let pixels = renderer.render(&store, &camera).to_vec();

        assert!(pixels.iter().all(|&p| p == 0x2288aa));
        assert!(renderer.coverage().is_fully_painted());
    }

    #[test]
    fn test_front_cube_occludes_back_cube() {
        let front = rgb_to_bgra(255, 0, 0);
        let back = rgb_to_bgra(0, 0, 255);
        let mut builder = OctreeBuilder::new(3);
        // Small cube ahead of a larger one on the same line of sight
        builder.insert(4, 4, 5, front);
        builder.insert_at(2, 2, 3, 2, back);
        let store = builder.build().unwrap();

        let mut renderer = Renderer::new(small_config(6, 3)).unwrap();
        let camera = Camera::new(DVec3::new(0.0, 0.0, -20.0));
        renderer.render(&store, &camera);

        let face = renderer.coverage();
        // Where both project, the front color wins
        assert_eq!(face.pixel(32, 32), front);
        // The back cube is larger: its silhouette shows around the front one
        let pixels = face.pixels();
        assert!(pixels.iter().any(|&p| p == back));
        assert!(pixels.iter().any(|&p| p == front));
    }

    #[test]
    fn test_camera_behind_scene_paints_nothing() {
        let store = homogeneous_store(RED);
        let mut renderer = Renderer::new(small_config(3, 4)).unwrap();
        // Past the scene, still looking +z: all corners behind the camera
        let camera = Camera::new(DVec3::new(0.0, 0.0, 100.0));
        let pixels = renderer.render(&store, &camera).to_vec();

        assert!(pixels.iter().all(|&p| p == CLEAR_COLOR));
        assert!(!renderer.coverage().is_fully_painted());
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut builder = OctreeBuilder::new(3);
        builder.insert(4, 4, 5, 0x00aa00);
        builder.insert_at(2, 2, 3, 2, 0x0000aa);
        let store = builder.build().unwrap();

        let mut renderer = Renderer::new(small_config(5, 3)).unwrap();
        let camera = Camera::look_at(
            DVec3::new(3.0, -2.0, -20.0),
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::Y,
        );
        let first = renderer.render(&store, &camera).to_vec();
        let second = renderer.render(&store, &camera).to_vec();
        assert_eq!(first, second);
    }

    struct CollectingPresenter {
        faces: Vec<(CubeFace, Vec<u32>)>,
    }

    impl Presenter for CollectingPresenter {
        fn present(&mut self, face: CubeFace, pixels: &[u32], _size: u32) {
            self.faces.push((face, pixels.to_vec()));
        }
    }

    #[test]
    fn test_cubemap_renders_forward_face() {
        let store = homogeneous_store(RED);
        let mut config = small_config(4, 4);
        config.frustum = Frustum::default();
        let mut renderer = Renderer::new(config).unwrap();
        let camera = Camera::new(DVec3::new(0.0, 0.0, 0.0));

        let mut presenter = CollectingPresenter { faces: Vec::new() };
        renderer.render_cubemap(&store, &camera, &mut presenter);

        // The forward face is rendered and red at its center
        let (_, pixels) = presenter
            .faces
            .iter()
            .find(|(f, _)| *f == CubeFace::PosZ)
            .expect("forward face not rendered");
        assert_eq!(pixels[8 * 16 + 8], RED);

        // The face behind the camera has no in-view tile at all
        assert!(presenter.faces.iter().all(|(f, _)| *f != CubeFace::NegZ));
    }

    #[test]
    fn test_cube_face_orientations_are_orthonormal() {
        for face in CubeFace::ALL {
            let m = face.orientation();
            let product = m * m.transpose();
            for col in 0..3 {
                for row in 0..3 {
                    let expect = if col == row { 1.0 } else { 0.0 };
                    assert!((product.col(col)[row] - expect).abs() < 1e-12);
                }
            }
            // Each face looks along its namesake axis: the world direction
            // mapping to face-forward (+z) is the axis itself.
            let axis = m.transpose() * DVec3::Z;
            let expect = match face {
                CubeFace::PosY => DVec3::Y,
                CubeFace::PosZ => DVec3::Z,
                CubeFace::PosX => DVec3::X,
                CubeFace::NegZ => -DVec3::Z,
                CubeFace::NegX => -DVec3::X,
                CubeFace::NegY => -DVec3::Y,
            };
            assert!((axis - expect).length() < 1e-12, "{:?}", face);
        }
    }
}
