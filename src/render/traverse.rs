//! Fused octree/quadtree traverse
//!
//! One recursion walks both trees. At each step it refines whichever
//! structure is currently coarser on screen: while the octree node's
//! projection still covers the current quadtree tile, the tile is split so
//! sub-tiles can terminate independently; once the node projects within the
//! tile, the node is split and its children are visited front to back.
//! Painted tiles clear their coverage flag, so the flag gate plus the
//! front-to-back order make the first color to reach a pixel the nearest
//! visible one.

use log::trace;

use crate::core::types::I64Vec3;
use crate::math::bounds::{self, CornerBounds, DELTA};
use crate::octree::node::{Child, SOLID};
use crate::octree::OctreeStore;
use crate::render::coverage::CoverageMap;
use crate::render::project::FrameSetup;

/// Counters for one traverse
#[derive(Debug, Default, Clone, Copy)]
pub struct TraverseStats {
    /// Octree nodes whose children were expanded
    pub octree_steps: u64,
    /// Quadtree nodes whose tiles were split
    pub quadtree_steps: u64,
    /// Leaf pixels painted
    pub leaves_painted: u64,
    /// Subvolumes rejected by the occlusion tests
    pub culled: u64,
}

/// One frame's traversal state: the borrowed arena and coverage map plus the
/// integer constants of the frame. Everything is passed explicitly so faces
/// could one day render in parallel on disjoint maps.
pub struct Traverser<'a> {
    store: &'a OctreeStore,
    face: &'a mut CoverageMap,
    furthest: usize,
    scene_size: i64,
    stats: TraverseStats,
}

impl<'a> Traverser<'a> {
    pub fn new(store: &'a OctreeStore, face: &'a mut CoverageMap) -> Self {
        Self {
            store,
            face,
            furthest: 0,
            scene_size: 0,
            stats: TraverseStats::default(),
        }
    }

    /// Walk the scene for one prepared frame. The coverage map must have
    /// been built for this frame; on return every in-view pixel the scene
    /// covers is painted.
    pub fn run(&mut self, setup: &FrameSetup, scene_depth: u32) -> TraverseStats {
        self.furthest = setup.furthest;
        self.scene_size = 1i64 << scene_depth;
        if self.face.in_view(0) {
            self.traverse(
                0,
                0,
                self.store.root_color(),
                &setup.bounds,
                setup.eye,
                scene_depth as i32 - 1,
            );
        }
        trace!("traverse done: {:?}", self.stats);
        self.stats
    }

    /// Returns true iff the quadtree subtree at `quadnode` became fully
    /// painted, letting the caller drop all remaining occluded siblings.
    /// Caller guarantees `map[quadnode]` is set.
    fn traverse(
        &mut self,
        quadnode: u32,
        octnode: u32,
        color: u32,
        bounds: &CornerBounds,
        pos: I64Vec3,
        depth: i32,
    ) -> bool {
        let span = bounds::projected_span(bounds, self.furthest);
        if depth >= 0 && span <= 2 * self.scene_size {
            self.descend_octree(quadnode, octnode, color, bounds, pos, depth)
        } else {
            self.descend_quadtree(quadnode, octnode, color, bounds, pos, depth)
        }
    }

    /// Split the octree node and visit its children nearest-first. The
    /// nearest octant is read off the sign bits of the eye position; the
    /// xor enumeration then preserves front-to-back order because any child
    /// occluding another differs from it only by bits flipped away from the
    /// eye, and so is enumerated earlier.
    fn descend_octree(
        &mut self,
        quadnode: u32,
        octnode: u32,
        color: u32,
        bounds: &CornerBounds,
        pos: I64Vec3,
        depth: i32,
    ) -> bool {
        self.stats.octree_steps += 1;
        let nearest = (((pos.x < 0) as usize) << 2)
            | (((pos.y < 0) as usize) << 1)
            | ((pos.z < 0) as usize);

        for k in 0..8 {
            let octant = nearest ^ k;
            let (child_index, child_color) = if octnode == SOLID {
                // Inside a homogeneous block: every octant repeats it
                (SOLID, color)
            } else {
                match self.store.get(octnode).child(octant) {
                    Child::Empty => continue,
                    Child::Solid(c) => (SOLID, c),
                    Child::Branch { index, color } => (index, color),
                }
            };

            let child_bounds = bounds::octant_bounds(bounds, octant);
            if bounds::is_behind(&child_bounds, self.furthest)
                || !bounds::overlaps_tile(&child_bounds)
            {
                self.stats.culled += 1;
                continue;
            }

            let child_pos = pos + DELTA[octant] * (1i64 << depth);
            if self.traverse(
                quadnode,
                child_index,
                child_color,
                &child_bounds,
                child_pos,
                depth - 1,
            ) {
                return true;
            }
        }
        false
    }

    /// Split the current tile into its four quadrants, painting at leaves.
    /// Sibling order is irrelevant here: the tiles are disjoint and each is
    /// gated on its own coverage flag.
    fn descend_quadtree(
        &mut self,
        quadnode: u32,
        octnode: u32,
        color: u32,
        bounds: &CornerBounds,
        pos: I64Vec3,
        depth: i32,
    ) -> bool {
        self.stats.quadtree_steps += 1;
        for quadrant in 0..4u32 {
            let child = quadnode * 4 + 4 + quadrant;
            if !self.face.in_view(child) {
                continue;
            }

            let child_bounds = bounds::quad_bounds(bounds, quadrant as usize);
            if bounds::is_behind(&child_bounds, self.furthest)
                || !bounds::overlaps_tile(&child_bounds)
            {
                self.stats.culled += 1;
                continue;
            }

            if self.face.is_leaf(child) {
                self.face.set_face(child, color);
                self.stats.leaves_painted += 1;
            } else {
                self.traverse(child, octnode, color, &child_bounds, pos, depth);
            }
        }
        self.face.compute(quadnode);
        !self.face.in_view(quadnode)
    }
}
