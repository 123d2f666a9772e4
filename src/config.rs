//! Engine configuration.
//!
//! ```toml
//! column_id_prefix = "column-"
//! resync_on_column_reorder_failure = false
//! data_dir = ".boardsync"
//! ```

use crate::error::{BoardSyncError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Prefix marking column identifiers in raw UI drag ids
    pub column_id_prefix: String,
    /// Resync after a rejected column reorder instead of keeping the local order
    pub resync_on_column_reorder_failure: bool,
    /// Directory created by the file-backed remote under its root
    pub data_dir: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            column_id_prefix: "column-".to_string(),
            resync_on_column_reorder_failure: false,
            data_dir: ".boardsync".to_string(),
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SyncConfig =
            toml::from_str(contents).map_err(|e| BoardSyncError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from a TOML file, falling back to defaults
    /// when the file does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.column_id_prefix.is_empty() {
            return Err(BoardSyncError::ConfigError(
                "column_id_prefix must not be empty".to_string(),
            ));
        }
        if self.data_dir.trim().is_empty() {
            return Err(BoardSyncError::ConfigError(
                "data_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BoardSyncError::ConfigError(e.to_string()))
    }
}
