//! # Configuration Loading
//!
//! Reads [`DispatchOptions`] from a YAML or JSON file. The format follows
//! the file extension; `.yaml`, `.yml` and `.json` are accepted. Without a
//! file the defaults apply.

use std::path::Path;

use anyhow::{bail, Context, Result};

use states_proxy::DispatchOptions;

/// Load dispatch options from `path`, or the defaults when `None`.
pub fn load_options(path: Option<&Path>) -> Result<DispatchOptions> {
    let Some(path) = path else {
        return Ok(DispatchOptions::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let options: DispatchOptions = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
        other => bail!(
            "unsupported config format {other:?} for {}: expected .yaml, .yml or .json",
            path.display()
        ),
    };

    tracing::debug!(
        path = %path.display(),
        resolution = ?options.resolution,
        auto_update = ?options.auto_update,
        default_state = %options.default_state,
        "loaded dispatch options"
    );
    Ok(options)
}
