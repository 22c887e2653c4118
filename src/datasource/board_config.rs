use std::{collections::HashMap, fs};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

/// Board-specific configuration. Shipped as TOML next to the daemon's other
/// control nodes; every field has a default matching the Ardbeg board so a
/// missing file is not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Logical input device names to toggle on interactive transitions
    #[serde(default = "default_input_devices")]
    pub input_devices: Vec<String>,
    /// Per-hint debounce interval overrides, microseconds, keyed by hint name
    #[serde(default)]
    pub hint_intervals: HashMap<String, u64>,
}

fn default_input_devices() -> Vec<String> {
    vec![
        "raydium_ts".to_string(),
        "touch".to_string(),
        "touch_fusion".to_string(),
    ]
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            input_devices: default_input_devices(),
            hint_intervals: HashMap::new(),
        }
    }
}

impl BoardConfig {
    pub fn load(config_file: &str) -> Self {
        match Self::read(config_file) {
            Ok(config) => {
                info!("Loaded board config: {config_file}");
                config
            }
            Err(e) => {
                warn!("Board config unavailable ({e}), using Ardbeg defaults");
                Self::default()
            }
        }
    }

    fn read(config_file: &str) -> Result<Self> {
        let content = fs::read_to_string(config_file)
            .with_context(|| format!("Failed to read board config: {config_file}"))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse board config: {config_file}"))
    }
}
