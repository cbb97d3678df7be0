//! Error types.
//!
//! Only the setup layers can fail. Geometric failures (misses, degenerate
//! triangles, parallel rays) are never errors; they surface as `None`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling a scene or loading its resources.
#[derive(Debug, Error)]
pub enum Error {
    /// The mesh has no triangles, so there is nothing to build a tree from.
    #[error("scene has no triangles")]
    EmptyScene,

    /// A placement with a zero scale factor cannot be inverted.
    #[error("transform is singular (scale {0:?})")]
    SingularTransform([f64; 3]),

    #[error("failed to load texture {path}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse render settings")]
    Settings(#[from] toml::de::Error),

    #[error("invalid render settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, Error>;
