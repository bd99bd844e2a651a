//! Core type aliases and re-exports

pub use glam::{DMat3, DVec3, I64Vec3, I64Vec4};

/// Standard Result type for the renderer
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
