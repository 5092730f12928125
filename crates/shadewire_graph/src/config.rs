// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resolver configuration.
//!
//! Stored as RON, for example:
//!
//! ```ron
//! ResolverConfig(
//!     diagnostics: true,
//!     warn_on_ambiguous_join: false,
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "resolver.ron";

/// Settings for the type resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Emit a debug trace of every refresh (base, generic and dominant types)
    pub diagnostics: bool,
    /// Warn when a fully connected node joins to `Pending` through an ambiguous pair
    pub warn_on_ambiguous_join: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            diagnostics: false,
            warn_on_ambiguous_join: true,
        }
    }
}

impl ResolverConfig {
    /// Parse a configuration from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Serialize the configuration as pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save the configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

/// Error loading or saving a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid RON for this config
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}
