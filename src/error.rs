//! Crate error type
//!
//! Only structural problems are errors: missing or malformed content and
//! failed save/restore. Out-of-range queries, missing scene transitions and
//! timer misuse are absorbed where they happen.

use thiserror::Error;

/// Errors produced while loading content or persisting state.
#[derive(Debug, Error)]
pub enum Error {
    /// A texture, sound or map name has no backing asset.
    #[error("missing {kind} asset '{name}'")]
    MissingAsset { kind: &'static str, name: String },

    /// A map failed validation at load time.
    #[error("malformed map '{name}': {reason}")]
    MalformedMap { name: String, reason: String },

    /// A scene name referenced by the flow is not registered.
    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    /// Save file was written by an incompatible version.
    #[error("save version {found} is not supported (expected {expected})")]
    SaveVersion { found: u32, expected: u32 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
