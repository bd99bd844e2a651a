//! Octree construction for tests, benches and demos
//!
//! The renderer consumes a read-only arena that normally comes from an
//! external store; this builder produces an equivalent in-memory arena from
//! individual voxel inserts.

use crate::core::types::Result;
use crate::octree::node::{rgb_to_bgra, Node, SOLID};
use crate::octree::store::{average_color, OctreeStore};

/// Mutable octree builder over a cubic voxel grid.
///
/// The grid has `2^depth` cells per side; cell (0, 0, 0) is the lowest
/// corner of the scene cube. Inserting into a region already covered by a
/// solid block first splits the block, so refinement order does not matter.
pub struct OctreeBuilder {
    nodes: Vec<Node>,
    depth: u32,
}

impl OctreeBuilder {
    /// Create a builder for a grid of `2^depth` cells per side
    pub fn new(depth: u32) -> Self {
        assert!(depth >= 1, "octree depth must be at least 1");
        Self {
            nodes: vec![Node::EMPTY],
            depth,
        }
    }

    /// Grid depth this builder was created with
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Insert a single voxel at full grid resolution
    pub fn insert(&mut self, x: u32, y: u32, z: u32, color: u32) {
        self.insert_at(x, y, z, self.depth, color);
    }

    /// Insert a solid block at a coarser level.
    ///
    /// `level` is the depth of the block's grid: level `d` addresses
    /// `2^d` blocks per side, each covering `2^(depth - d)` full-resolution
    /// cells per side.
    pub fn insert_at(&mut self, x: u32, y: u32, z: u32, level: u32, color: u32) {
        assert!(level >= 1 && level <= self.depth, "level out of range");
        let size = 1u32 << level;
        assert!(x < size && y < size && z < size, "cell out of range");

        let mut current = 0usize;
        for bit in (0..level).rev() {
            let octant = ((((x >> bit) & 1) << 2)
                | (((y >> bit) & 1) << 1)
                | ((z >> bit) & 1)) as usize;

            if bit == 0 {
                let node = &mut self.nodes[current];
                node.child[octant] = SOLID;
                node.avgcolor[octant] = color as i32;
                break;
            }

            let slot_color = self.nodes[current].avgcolor[octant];
            let slot_child = self.nodes[current].child[octant];
            let next = if slot_color < 0 {
                let index = self.push(Node::EMPTY);
                let node = &mut self.nodes[current];
                node.child[octant] = index;
                node.avgcolor[octant] = color as i32;
                index
            } else if slot_child == SOLID {
                // Split the solid block into eight solid octants first
                let index = self.push(Node {
                    child: [SOLID; 8],
                    avgcolor: [slot_color; 8],
                });
                self.nodes[current].child[octant] = index;
                index
            } else {
                slot_child
            };
            current = next as usize;
        }
    }

    /// Finish: recompute interior average colors bottom-up and validate the
    /// arena.
    pub fn build(mut self) -> Result<OctreeStore> {
        self.refresh_averages(0);
        OctreeStore::from_nodes(self.nodes)
    }

    fn push(&mut self, node: Node) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        index
    }

    /// Recompute the average color of every branch slot under `index`,
    /// returning the node's own average.
    fn refresh_averages(&mut self, index: u32) -> i32 {
        for octant in 0..8 {
            let node = &self.nodes[index as usize];
            if node.avgcolor[octant] < 0 || node.child[octant] == SOLID {
                continue;
            }
            let child = node.child[octant];
            let avg = self.refresh_averages(child);
            self.nodes[index as usize].avgcolor[octant] = avg;
        }
        average_color(&self.nodes[index as usize]) as i32
    }
}

/// Build a hollow voxel sphere centered in the grid, colored by surface
/// normal. Handy for benches and demos.
pub fn create_test_sphere(depth: u32, radius: f64) -> Result<OctreeStore> {
    let size = 1u32 << depth;
    let center = size as f64 / 2.0;
    let mut builder = OctreeBuilder::new(depth);
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let dx = x as f64 + 0.5 - center;
                let dy = y as f64 + 0.5 - center;
                let dz = z as f64 + 0.5 - center;
                let d = (dx * dx + dy * dy + dz * dz).sqrt();
                if (d - radius).abs() <= 0.9 {
                    let r = (128.0 + 127.0 * dx / d) as u8;
                    let g = (128.0 + 127.0 * dy / d) as u8;
                    let b = (128.0 + 127.0 * dz / d) as u8;
                    builder.insert(x, y, z, rgb_to_bgra(r, g, b));
                }
            }
        }
    }
    builder.build()
}
