//! Mathematical utilities for the rasterizer

pub mod bounds;
pub mod frustum;
pub mod morton;

pub use bounds::{CornerBounds, DELTA};
pub use frustum::Frustum;
