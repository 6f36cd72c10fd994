use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::Units;

/// Process-wide settings for a provider client, stored on disk as TOML.
///
/// Example TOML:
/// ```toml
/// base_url = "https://api.example.com/v1"
/// user_agent = "my-app/1.0"
/// default_units = "imperial"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClientConfig {
    /// Base that relative URL fragments from a backend are joined onto.
    pub base_url: Option<String>,

    pub user_agent: Option<String>,

    /// Units handed to the mapper when a query doesn't specify any.
    pub default_units: Option<Units>,
}

impl ClientConfig {
    /// Load config from the platform config directory.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: ClientConfig = toml::from_str(contents)?;

        if let Some(base) = cfg.base_url.as_deref() {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(anyhow!("base_url must be an http(s) URL, got '{base}'"));
            }
        }

        Ok(cfg)
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Write config as TOML to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let text = toml::to_string_pretty(self).context("Failed to serialize client config")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-core", "weather-core")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("weather-core/{}", env!("CARGO_PKG_VERSION")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = ClientConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let cfg = ClientConfig::from_toml_str(
            r#"
            base_url = "https://api.example.com/v1"
            user_agent = "tester/0.1"
            default_units = "imperial"
            "#,
        )
        .expect("config parses");

        assert_eq!(cfg.base_url.as_deref(), Some("https://api.example.com/v1"));
        assert_eq!(cfg.effective_user_agent(), "tester/0.1");
        assert_eq!(cfg.default_units, Some(Units::Imperial));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ClientConfig::from_toml_str(r#"base_url = "ftp://example.com""#).unwrap_err();
        assert!(err.to_string().contains("base_url must be an http(s) URL"));
    }

    #[test]
    fn default_user_agent_carries_crate_version() {
        let ua = ClientConfig::default().effective_user_agent();
        assert!(ua.starts_with("weather-core/"));
    }

    #[test]
    fn toml_roundtrip_keeps_units() {
        let cfg = ClientConfig { default_units: Some(Units::Metric), ..ClientConfig::default() };
        let text = toml::to_string_pretty(&cfg).unwrap();

        assert_eq!(ClientConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ClientConfig::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn save_then_load_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = ClientConfig {
            base_url: Some("https://api.example.com/v1".into()),
            user_agent: Some("tester/0.1".into()),
            default_units: Some(Units::Imperial),
        };

        cfg.save_to(&path).expect("config saves");
        assert_eq!(ClientConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn load_reports_path_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, r#"base_url = "ftp://example.com""#).unwrap();

        let err = ClientConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn config_file_lives_in_platform_dir() {
        // ProjectDirs needs a home directory; skip quietly where there is none.
        if let Ok(path) = ClientConfig::config_file_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
