//! Putting rewritten content back on disk.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How rewritten content replaces the original file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Truncate the file and write the new content through one handle.
    /// A failure mid-write can leave the file truncated.
    #[default]
    InPlace,
    /// Write to a sibling temporary file, then rename it over the original.
    Atomic,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InPlace => write!(f, "in_place"),
            Self::Atomic => write!(f, "atomic"),
        }
    }
}

/// Replace the content of `path` with `content`.
pub fn write_content(path: &Path, content: &str, mode: WriteMode) -> std::io::Result<()> {
    debug!(path = %path.display(), %mode, bytes = content.len(), "writing resolved content");
    match mode {
        WriteMode::InPlace => write_in_place(path, content),
        WriteMode::Atomic => write_atomic(path, content),
    }
}

fn write_in_place(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    // Rename over the file a symlink points at, never over the link itself.
    let target = std::fs::canonicalize(path)?;
    // Same writability rules as an in-place write; opened without truncating.
    OpenOptions::new().write(true).open(&target)?;

    // The temporary must live on the same filesystem for the rename to be atomic.
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let permissions = std::fs::metadata(&target)?.permissions();

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}
