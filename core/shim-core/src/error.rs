//! Error types for shim-core operations.
//!
//! Blocked legacy invocations are not errors: they are an expected
//! `Resolution::Block`. These variants cover broken installations and
//! environment problems only.

use std::path::PathBuf;

/// All errors that can occur in shim-core operations.
#[derive(Debug, thiserror::Error)]
pub enum ShimError {
    // ─────────────────────────────────────────────────────────────────────
    // Installation Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Shim directory cannot be resolved: {path}: {reason}")]
    ShimDirUnresolvable { path: PathBuf, reason: String },

    #[error("Path is not valid UTF-8 and cannot be written to a shell line: {0}")]
    NonUtf8Path(PathBuf),

    #[error("Session environment file write failed: {path}: {source}")]
    EnvFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to link shim {name} in {dir}: {source}")]
    Link {
        name: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Delegation Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using ShimError.
pub type Result<T> = std::result::Result<T, ShimError>;

impl From<ShimError> for String {
    fn from(err: ShimError) -> String {
        err.to_string()
    }
}
