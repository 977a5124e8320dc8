//! Navigation configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use waymark_state::{StateOptions, UnderflowPolicy};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Behavior of `remove_last_n` past the stack depth
    pub underflow_policy: UnderflowPolicy,
    /// Clear restore entries that drop out during `set_items`
    pub prune_restore_on_set_items: bool,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn state_options(&self) -> StateOptions {
        StateOptions {
            underflow_policy: self.underflow_policy,
            prune_restore_on_set_items: self.prune_restore_on_set_items,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            underflow_policy: UnderflowPolicy::Raise,
            prune_restore_on_set_items: false,
        }
    }
}
