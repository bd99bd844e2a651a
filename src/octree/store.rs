//! Read-only octree node arena

use crate::core::types::Result;
use crate::core::Error;
use crate::octree::node::{bgra_to_rgb, rgb_to_bgra, Child, Node};

/// Flat random-access arena of octree nodes. Root is at index 0. Immutable
/// for the renderer; a frame only ever borrows it.
#[derive(Debug, Clone)]
pub struct OctreeStore {
    nodes: Vec<Node>,
    root_color: u32,
}

impl OctreeStore {
    /// Wrap a node array, checking that every occupied slot points inside
    /// the arena.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::MalformedOctree("empty node arena".into()));
        }
        let len = nodes.len();
        for (index, node) in nodes.iter().enumerate() {
            for octant in 0..8 {
                if let Child::Branch { index: child, .. } = node.child(octant) {
                    if child as usize >= len {
                        return Err(Error::MalformedOctree(format!(
                            "node {} octant {} points at {} but arena has {} nodes",
                            index, octant, child, len
                        )));
                    }
                }
            }
        }
        let root_color = average_color(&nodes[0]);
        Ok(Self { nodes, root_color })
    }

    /// Get node by index
    #[inline]
    pub fn get(&self, index: u32) -> &Node {
        &self.nodes[index as usize]
    }

    /// Number of nodes in the arena
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Average color over the root's occupied slots (0 if the scene is empty)
    pub fn root_color(&self) -> u32 {
        self.root_color
    }

    /// Arena memory footprint in bytes
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Node>() * self.nodes.len()
    }
}

/// Average the colors of a node's occupied slots
pub(crate) fn average_color(node: &Node) -> u32 {
    let (mut r, mut g, mut b, mut n) = (0u32, 0u32, 0u32, 0u32);
    for octant in 0..8 {
        let color = node.avgcolor[octant];
        if color < 0 {
            continue;
        }
        let (cr, cg, cb) = bgra_to_rgb(color as u32);
        r += cr as u32;
        g += cg as u32;
        b += cb as u32;
        n += 1;
    }
    if n == 0 {
        return 0;
    }
    rgb_to_bgra((r / n) as u8, (g / n) as u8, (b / n) as u8)
}
