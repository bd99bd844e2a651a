//! Screen-space coverage quadtree
//!
//! A complete quadtree over a `SIZE x SIZE` pixel square, flattened so the
//! children of node `r` are `4r+4 .. 4r+8` and the leaves are the pixels.
//! `map[r]` records whether node `r` still contains an in-view, unpainted
//! pixel; the traverse gates its descent on it and clears it leaf by leaf as
//! pixels are painted, so fully painted regions cut off everything behind
//! them.

use crate::core::types::DVec3;
use crate::math::morton;

/// Sentinel color the face buffer is cleared to at frame start
pub const CLEAR_COLOR: u32 = 0xC0C0_C0C0;

/// Largest supported quadtree depth (4096 x 4096 pixels)
pub const MAX_DEPTH: u32 = 12;

/// Coverage quadtree plus the face pixel buffer it paints into.
///
/// The pixel buffer is row-major BGRA8, `size * size` entries; leaf nodes
/// are Z-ordered and mapped to pixels through their Morton path.
pub struct CoverageMap {
    size: u32,
    leaf_base: u32,
    map: Vec<bool>,
    face: Vec<u32>,
}

impl CoverageMap {
    /// Create a map of the given depth with `2^depth` pixels per side
    pub fn new(depth: u32) -> Self {
        assert!(
            (1..=MAX_DEPTH).contains(&depth),
            "quadtree depth must be in 1..={}",
            MAX_DEPTH
        );
        let size = 1u32 << depth;
        let leaf_base = (0..depth).fold(0u32, |first, _| 4 * first + 4);
        let node_count = leaf_base as usize + (size as usize * size as usize);
        Self {
            size,
            leaf_base,
            map: vec![false; node_count],
            face: vec![CLEAR_COLOR; size as usize * size as usize],
        }
    }

    /// Pixels per side
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Index of the first leaf node
    pub fn leaf_base(&self) -> u32 {
        self.leaf_base
    }

    /// True if node `r` still holds an in-view, unpainted pixel
    #[inline]
    pub fn in_view(&self, node: u32) -> bool {
        self.map[node as usize]
    }

    /// True if `node` is a leaf (single pixel)
    #[inline]
    pub fn is_leaf(&self, node: u32) -> bool {
        node >= self.leaf_base
    }

    /// Paint a leaf and mark it done
    #[inline]
    pub fn set_face(&mut self, leaf: u32, color: u32) {
        debug_assert!(self.is_leaf(leaf));
        let (x, y) = morton::decode_morton_2d(leaf - self.leaf_base);
        self.face[(y * self.size + x) as usize] = color;
        self.map[leaf as usize] = false;
    }

    /// Recompute an internal node's flag from its four children
    #[inline]
    pub fn compute(&mut self, node: u32) {
        let child = node as usize * 4 + 4;
        self.map[node as usize] =
            self.map[child] | self.map[child + 1] | self.map[child + 2] | self.map[child + 3];
    }

    /// True once no in-view pixel remains unpainted
    pub fn is_fully_painted(&self) -> bool {
        !self.map[0]
    }

    /// Prepare for a single-screen frame: clear the face buffer and mark
    /// every node whose tile intersects the `width x height` screen region
    /// in the quadtree's upper-left corner.
    pub fn build_screen(&mut self, width: u32, height: u32) {
        self.face.fill(CLEAR_COLOR);
        self.map.fill(false);
        self.mark_screen(0, 0, 0, self.size, width, height);
    }

    fn mark_screen(&mut self, node: u32, x: u32, y: u32, tile: u32, width: u32, height: u32) {
        if x >= width || y >= height {
            return;
        }
        self.map[node as usize] = true;
        if self.is_leaf(node) {
            return;
        }
        let half = tile / 2;
        for quadrant in 0..4u32 {
            let cx = x + if quadrant & 1 != 0 { half } else { 0 };
            let cy = y + if quadrant & 2 != 0 { half } else { 0 };
            self.mark_screen(node * 4 + 4 + quadrant, cx, cy, half, width, height);
        }
    }

    /// Prepare for one cubemap face: clear the face buffer and mark every
    /// node whose tile cone intersects the view pyramid given by four inward
    /// plane normals in face space (face plane at z = 1, tiles mapped to
    /// [-1, 1] x [-1, 1]).
    pub fn build_cubemap(&mut self, planes: &[DVec3; 4]) {
        self.face.fill(CLEAR_COLOR);
        self.map.fill(false);
        self.mark_pyramid(0, 0, 0, self.size, planes);
    }

    /// Returns whether the node ended up marked, so internal flags stay the
    /// OR of their children.
    fn mark_pyramid(&mut self, node: u32, x: u32, y: u32, tile: u32, planes: &[DVec3; 4]) -> bool {
        let scale = 2.0 / self.size as f64;
        let corners = [
            DVec3::new(x as f64 * scale - 1.0, y as f64 * scale - 1.0, 1.0),
            DVec3::new((x + tile) as f64 * scale - 1.0, y as f64 * scale - 1.0, 1.0),
            DVec3::new(x as f64 * scale - 1.0, (y + tile) as f64 * scale - 1.0, 1.0),
            DVec3::new(
                (x + tile) as f64 * scale - 1.0,
                (y + tile) as f64 * scale - 1.0,
                1.0,
            ),
        ];

        let mut straddles = false;
        for plane in planes {
            let mut any_inside = false;
            let mut all_inside = true;
            for corner in &corners {
                if plane.dot(*corner) >= 0.0 {
                    any_inside = true;
                } else {
                    all_inside = false;
                }
            }
            if !any_inside {
                // Tile cone entirely outside this plane
                return false;
            }
            if !all_inside {
                straddles = true;
            }
        }

        if !straddles || self.is_leaf(node) {
            self.mark_subtree(node);
            return true;
        }

        let half = tile / 2;
        let mut any_child = false;
        for quadrant in 0..4u32 {
            let cx = x + if quadrant & 1 != 0 { half } else { 0 };
            let cy = y + if quadrant & 2 != 0 { half } else { 0 };
            any_child |= self.mark_pyramid(node * 4 + 4 + quadrant, cx, cy, half, planes);
        }
        self.map[node as usize] = any_child;
        any_child
    }

    fn mark_subtree(&mut self, node: u32) {
        self.map[node as usize] = true;
        if !self.is_leaf(node) {
            for quadrant in 0..4 {
                self.mark_subtree(node * 4 + 4 + quadrant);
            }
        }
    }

    /// Painted pixels, row-major BGRA8
    pub fn pixels(&self) -> &[u32] {
        &self.face
    }

    /// Painted pixels as raw bytes (BGRA8 memory order)
    pub fn pixel_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.face)
    }

    /// One pixel by screen coordinate
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.face[(y * self.size + x) as usize]
    }
}
