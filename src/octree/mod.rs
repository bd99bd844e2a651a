//! Sparse voxel octree: node layout, read-only arena, and a builder for
//! constructing in-memory scenes

pub mod node;
pub mod store;
pub mod builder;

pub use node::{bgra_to_rgb, rgb_to_bgra, Child, Node, SOLID};
pub use store::OctreeStore;
pub use builder::{create_test_sphere, OctreeBuilder};
