//! TOML configuration for the mof-screen binary.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use mofdata::{ColumnSchema, FilterConfig};

/// Top-level config file: `[filter]` tunes the validation pipeline,
/// `[schema]` remaps source column names. Both sections are optional and
/// default to the domain conventions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub schema: ColumnSchema,
}

/// Load the config, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ScreenConfig> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: ScreenConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))?;
            tracing::info!(path = %path.display(), "Loaded config");
            Ok(config)
        }
        None => Ok(ScreenConfig::default()),
    }
}
