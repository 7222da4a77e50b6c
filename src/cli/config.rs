use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::arm::DeploymentMode;

pub const CONFIG_FILENAME: &str = ".azworkshops.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_config_from_path(CONFIG_FILENAME)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(CONFIG_FILENAME)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Configured deployment mode, validated
    pub fn deployment_mode(&self) -> Result<Option<DeploymentMode>> {
        self.mode
            .as_deref()
            .map(|m| m.parse::<DeploymentMode>())
            .transpose()
            .with_context(|| format!("Invalid mode in {}", CONFIG_FILENAME))
    }
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.as_ref().display()))?;
    Ok(config)
}

/// User-level config (~/.config/azworkshops/config.toml on Linux)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("azworkshops").join("config.toml"))
}

/// Load project config, falling back to the user-level file.
///
/// Distinguishes "no file" (`Ok(None)`) from "file invalid" (`Err`).
pub fn load_config() -> Result<Option<Config>> {
    if Path::new(CONFIG_FILENAME).exists() {
        return Config::load().map(Some);
    }

    match user_config_path() {
        Some(path) if path.exists() => load_config_from_path(path).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
location = "eastus"
subscription_id = "00000000-0000-0000-0000-000000000000"
prefix = "lab"
mode = "incremental"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.location.as_deref(), Some("eastus"));
        assert_eq!(config.prefix.as_deref(), Some("lab"));
        assert_eq!(
            config.deployment_mode().unwrap(),
            Some(DeploymentMode::Incremental)
        );
    }

    #[test]
    fn test_invalid_mode_is_an_error() {
        let config = Config {
            mode: Some("partial".to_string()),
            ..Config::default()
        };
        assert!(config.deployment_mode().is_err());
    }

    #[test]
    fn test_load_config_not_found() {
        let result = load_config_from_path("/nonexistent/.azworkshops.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let config = Config {
            location: Some("westeurope".to_string()),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "location = \"westeurope\"");
        assert_eq!(load_config_from_path(&path).unwrap(), config);
    }
}
