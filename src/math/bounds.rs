//! Integer projected-bounds vectors for subvolume culling
//!
//! Each octree subvolume is tracked as eight 4-lane integer vectors, one per
//! cube corner. The lanes are signed offsets of the corner's projection from
//! the four edges of the current quadtree tile, in the order
//! (left, right, bottom, top): for a corner at view-space (x, y, z) and tile
//! edges X0..X1 (horizontal) and Y0..Y1 (vertical, y grows downward),
//!
//! ```text
//! lane 0 = z*X0/near - x      inside when < 0
//! lane 1 = z*X1/near - x      inside when > 0
//! lane 2 = z*Y1/near - y      inside when > 0
//! lane 3 = z*Y0/near - y      inside when < 0
//! ```
//!
//! The map from a world point to its lane vector is affine, so corner-wise
//! extremes bound the whole convex subvolume and all tests below are exactly
//! conservative. Descending the octree uses the corner-sum rule (child
//! corner j sits at the midpoint of parent corners i and j, so the child
//! vector is the parent sum at twice the scale); descending the quadtree
//! averages each vector with a per-quadrant shuffle of itself, which rewrites
//! the lanes against the child tile's edges at unchanged scale.
//!
//! Lanes are i64: the root projection already reaches 8x the scene size, and
//! the corner-sum rule doubles the scale per octree level, so scene depths
//! near 30 push intermediate sums well past i32.

use crate::core::types::{I64Vec3, I64Vec4};

/// Corner offset directions of a cube, indexed by octant.
/// Bit 2 selects +x, bit 1 selects +y, bit 0 selects +z.
pub const DELTA: [I64Vec3; 8] = [
    I64Vec3::new(-1, -1, -1),
    I64Vec3::new(-1, -1, 1),
    I64Vec3::new(-1, 1, -1),
    I64Vec3::new(-1, 1, 1),
    I64Vec3::new(1, -1, -1),
    I64Vec3::new(1, -1, 1),
    I64Vec3::new(1, 1, -1),
    I64Vec3::new(1, 1, 1),
];

/// Projected bounds of a subvolume: one lane vector per cube corner
pub type CornerBounds = [I64Vec4; 8];

/// Lane sources for the four quadtree quadrants (children `4r+4 .. 4r+8`).
/// Averaging a vector with its shuffle moves the split tile edges to the
/// quadrant: quadrant 0 = left/top, 1 = right/top, 2 = left/bottom,
/// 3 = right/bottom.
const QUAD_SHUFFLE: [[usize; 4]; 4] = [
    [0, 0, 3, 3],
    [1, 1, 3, 3],
    [0, 0, 2, 2],
    [1, 1, 2, 2],
];

#[inline]
fn shuffle(v: I64Vec4, lanes: [usize; 4]) -> I64Vec4 {
    let a = v.to_array();
    I64Vec4::new(a[lanes[0]], a[lanes[1]], a[lanes[2]], a[lanes[3]])
}

#[inline]
fn halve(v: I64Vec4) -> I64Vec4 {
    I64Vec4::new(v.x >> 1, v.y >> 1, v.z >> 1, v.w >> 1)
}

/// Bounds of octree child `octant` from its parent's corner bounds
/// (corner-sum rule, result carries twice the parent scale).
#[inline]
pub fn octant_bounds(parent: &CornerBounds, octant: usize) -> CornerBounds {
    let pivot = parent[octant];
    let mut out = [I64Vec4::ZERO; 8];
    for (o, p) in out.iter_mut().zip(parent.iter()) {
        *o = pivot + *p;
    }
    out
}

/// Bounds relative to quadtree child tile `quadrant` (0..4)
#[inline]
pub fn quad_bounds(parent: &CornerBounds, quadrant: usize) -> CornerBounds {
    let lanes = QUAD_SHUFFLE[quadrant];
    let mut out = [I64Vec4::ZERO; 8];
    for (o, p) in out.iter_mut().zip(parent.iter()) {
        *o = halve(*p + shuffle(*p, lanes));
    }
    out
}

/// Conservative test: does the subvolume's projection overlap the current
/// tile? Requires, for each tile edge, at least one corner strictly on the
/// inner side. Never rejects a subvolume that is partially visible in the
/// tile; may accept one that is not.
#[inline]
pub fn overlaps_tile(bounds: &CornerBounds) -> bool {
    let mut lo = bounds[0];
    let mut hi = bounds[0];
    for b in &bounds[1..] {
        lo = lo.min(*b);
        hi = hi.max(*b);
    }
    lo.x < 0 && hi.y > 0 && hi.z > 0 && lo.w < 0
}

/// True if the subvolume lies entirely behind the camera plane.
///
/// The right-minus-left span at any corner is proportional to that corner's
/// view depth; `furthest` indexes the corner with maximal depth, so a
/// non-positive span there means no part of the volume is in front.
#[inline]
pub fn is_behind(bounds: &CornerBounds, furthest: usize) -> bool {
    projected_span(bounds, furthest) <= 0
}

/// Right-minus-left lane span at the given corner
#[inline]
pub fn projected_span(bounds: &CornerBounds, furthest: usize) -> i64 {
    let b = bounds[furthest];
    b.y - b.x
}
