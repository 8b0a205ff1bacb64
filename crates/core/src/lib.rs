//! keepours core library.
//!
//! Scans text files for version-control merge-conflict markers and collapses
//! each conflict block to its "ours" side, dropping "theirs" and every marker
//! line.

pub mod config;
pub mod conflict;
pub mod errors;

// Re-exports for convenience.
pub use config::AppConfig;
pub use conflict::ConflictResolver;
