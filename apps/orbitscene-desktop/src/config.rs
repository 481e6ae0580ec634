use anyhow::{Context, Result};
use orbitscene_common::ControlSettings;
use std::path::Path;

/// Parse a settings document. Missing fields take their defaults.
pub fn parse_settings(text: &str) -> Result<ControlSettings> {
    let settings: ControlSettings = serde_json::from_str(text).context("invalid settings JSON")?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_settings(path: &Path) -> Result<ControlSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings =
        parse_settings(&text).with_context(|| format!("in settings file {}", path.display()))?;
    tracing::info!(path = %path.display(), ?settings, "settings file loaded");
    Ok(settings)
}
