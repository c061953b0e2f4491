use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for a conversion run.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Extension (without the dot) of the input files to consider.
    pub extension: String,
    /// Relative tolerance written into rewritten `assert_close` calls.
    pub rtol: f64,
    /// Absolute tolerance written into rewritten `assert_close` calls.
    pub atol: f64,
    /// Python package the experimental kernel is imported from.
    pub experimental_module: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            extension: "py".to_string(),
            rtol: 1e-3,
            atol: 1e-3,
            experimental_module: "flag_gems.experimental_ops".to_string(),
        }
    }
}

/// Load a conversion config from a JSON file.
pub fn load_convert_config(path: &Path) -> Result<ConvertConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read convert config at {}", path.display()))?;
    let config: ConvertConfig =
        serde_json::from_str(&body).context("Failed to parse convert config JSON")?;
    Ok(config)
}
