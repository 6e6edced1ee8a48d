//! Configuration for the accessor synthesis driver

use crate::errors::ConfigError;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MapperConfig {
    /// Inject accessor types into eligible classes. Off unless asked for.
    pub inline: bool,
}

impl MapperConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document is a valid, all-defaults config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(content)?)
    }

    /// Load configuration from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Like [`MapperConfig::load`], but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }
}
