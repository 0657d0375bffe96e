//! Configuration file loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use step_viewer_loader::LoaderConfig;
use step_viewer_scene::ViewerConfig;

/// Contents of the JSON configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub loader: LoaderConfig,
    pub viewer: ViewerConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Load the configuration, falling back to defaults without a file
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        log::info!("No configuration file given, using defaults");
        return Ok(AppConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = AppConfig::from_json_str(&content)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_default_independently() {
        let config = AppConfig::from_json_str(
            r#"{ "loader": { "kernel_timeout_ms": 250 }, "viewer": { "pieces": ["Part7.stp"] } }"#,
        )
        .unwrap();
        assert_eq!(config.loader.kernel_timeout_ms, 250);
        assert_eq!(config.loader.poll_interval_ms, 100);
        assert_eq!(config.viewer.pieces, vec!["Part7.stp".to_string()]);
        assert_eq!(config.viewer.transition.slide_distance, 30.0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/step-viewer.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
        assert_eq!(load_config(None).unwrap(), AppConfig::default());
    }
}
