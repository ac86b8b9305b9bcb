//! Level-load failures
//!
//! Everything here is local to building a level; nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    /// The generated scene has no player entity
    #[error("level `{level}` has no player")]
    PlayerNotFound { level: String },

    /// No source is registered under this level name
    #[error("unknown level `{0}`")]
    UnknownLevel(String),

    /// Per-source slice requested past the end of the generated set
    #[error("source index {index} out of range ({len} sources)")]
    SourceIndexOutOfRange { index: usize, len: usize },

    #[error("failed to read level file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = LevelError> = std::result::Result<T, E>;
