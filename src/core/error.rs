//! Error types for the renderer

use thiserror::Error;

/// Main error type for the renderer
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed octree: {0}")]
    MalformedOctree(String),
}
