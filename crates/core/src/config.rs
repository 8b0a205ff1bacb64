//! TOML-based options file for keepours.
//!
//! The tool needs no configuration: every field defaults to the behavior of
//! a bare `keepours <paths>` invocation. A file is only read when the caller
//! asks for one explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conflict::{ResolveOptions, SeparatorPolicy, WriteMode};
use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Resolver behavior settings.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// What the driver does when a path fails to resolve.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first failure; remaining paths are left untouched.
    #[default]
    Abort,
    /// Log the failure and carry on with the remaining paths.
    Continue,
}

/// The `[resolver]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    /// How a `=======` line outside an open conflict is treated.
    #[serde(default)]
    pub separator_policy: SeparatorPolicy,

    /// How the rewritten content is put back on disk.
    #[serde(default)]
    pub write_mode: WriteMode,

    /// Failure handling across multiple paths.
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl ResolverConfig {
    /// The per-file options this section describes.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            separator_policy: self.separator_policy,
            write_mode: self.write_mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load and parse a configuration file from disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;

        debug!(?config, "configuration parsed successfully");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
