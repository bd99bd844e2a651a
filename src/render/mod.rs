//! CPU rasterization: coverage quadtree, projection setup, fused traverse,
//! and the face drivers

pub mod coverage;
pub mod project;
pub mod traverse;
pub mod frame;

pub use coverage::{CoverageMap, CLEAR_COLOR};
pub use frame::{CubeFace, Presenter, RenderConfig, Renderer};
pub use project::FrameSetup;
pub use traverse::{TraverseStats, Traverser};
