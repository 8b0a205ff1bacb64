//! Error types for the keepours core library.
//!
//! Each subsystem has its own error type derived with `thiserror`.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Resolve errors
// ---------------------------------------------------------------------------

/// Errors from resolving a single file.
///
/// A missing path is not represented here: the CLI-facing entry point
/// reports it as [`FileOutcome::Skipped`](crate::conflict::FileOutcome).
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The file could not be opened or read.
    #[error("failed to read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid UTF-8 text.
    #[error("'{}' is not valid UTF-8 text", path.display())]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The rewritten content could not be written back.
    #[error("failed to write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// The path of the file the failure belongs to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::InvalidUtf8 { path, .. } | Self::Write { path, .. } => {
                path
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading the optional TOML options file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
