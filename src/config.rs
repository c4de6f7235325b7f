use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::options::StreamOptions;

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "PLSTREAM_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults applied to every stream before command-line options
    pub stream: StreamOptions,
    pub logging: LoggingConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: Option<String>, // EnvFilter directives, RUST_LOG wins when set
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub streams: usize, // Number of streams drawn side by side
    pub points: usize,  // Samples along each curve
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            streams: 1,
            points: 60,
        }
    }
}

impl Config {
    /// Default location: `$PLSTREAM_CONFIG`, else `<config dir>/plstream/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("plstream").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            // Return default if no config file
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Rgb;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.stream.device = Some("svg".to_string());
        config.stream.background = Some(Rgb::WHITE);
        config.logging.filter = Some("plstream=debug".to_string());
        config.demo.streams = 2;
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[stream]\ndevice = \"pdfcairo\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.stream.device.as_deref(), Some("pdfcairo"));
        assert_eq!(loaded.demo, DemoConfig::default());
        assert_eq!(loaded.logging.filter, None);
    }

    #[test]
    fn test_invalid_background_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[stream]\nbackground = \"purple\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
