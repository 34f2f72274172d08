use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Global configuration loaded from `~/.config/pipeview/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeviewConfig {
    /// Default status-line template; display flags on the command line win.
    #[serde(default)]
    pub format: Option<String>,
    /// Seconds between status updates.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,
    /// Seconds of history behind the average rate and the ETA.
    #[serde(default = "default_average_rate_window")]
    pub average_rate_window: u32,
    /// Terminal width assumed when it cannot be queried.
    #[serde(default = "default_width")]
    pub default_width: usize,
    /// Terminal height assumed when it cannot be queried.
    #[serde(default = "default_height")]
    pub default_height: usize,
    /// Keep drawing even when not the foreground process of the terminal.
    #[serde(default)]
    pub force: bool,
    /// Show bits instead of bytes.
    #[serde(default)]
    pub bits: bool,
}

fn default_interval_secs() -> f64 {
    1.0
}

fn default_average_rate_window() -> u32 {
    30
}

fn default_width() -> usize {
    DEFAULT_WIDTH
}

fn default_height() -> usize {
    DEFAULT_HEIGHT
}

impl Default for PipeviewConfig {
    fn default() -> Self {
        Self {
            format: None,
            interval_secs: default_interval_secs(),
            average_rate_window: default_average_rate_window(),
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
            force: false,
            bits: false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pipeview")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PipeviewConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like [`load_or_init`] but for an arbitrary location.
pub fn load_or_init_at(path: &Path) -> Result<PipeviewConfig> {
    if !path.exists() {
        let default_cfg = PipeviewConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

/// Load an existing config file (e.g. one named with `--config`).
pub fn load_from_path(path: &Path) -> Result<PipeviewConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: PipeviewConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = PipeviewConfig::default();
        assert_eq!(cfg.interval_secs, 1.0);
        assert_eq!(cfg.average_rate_window, 30);
        assert_eq!(cfg.default_width, 80);
        assert_eq!(cfg.default_height, 25);
        assert!(cfg.format.is_none());
        assert!(!cfg.force);
        assert!(!cfg.bits);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = PipeviewConfig {
            format: Some("%b %r".to_string()),
            ..PipeviewConfig::default()
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: PipeviewConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_minimal() {
        let toml = r#"
            interval_secs = 0.5
            average_rate_window = 10
        "#;
        let cfg: PipeviewConfig = toml::from_str(toml).unwrap();
        assert!((cfg.interval_secs - 0.5).abs() < 1e-9);
        assert_eq!(cfg.average_rate_window, 10);
        assert_eq!(cfg.default_width, 80);
        assert_eq!(cfg.default_height, 25);
        assert!(cfg.format.is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            format = "%N %b %p"
            interval_secs = 2.0
            average_rate_window = 60
            default_width = 132
            default_height = 50
            force = true
            bits = true
        "#;
        let cfg: PipeviewConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.format.as_deref(), Some("%N %b %p"));
        assert_eq!(cfg.default_width, 132);
        assert_eq!(cfg.default_height, 50);
        assert!(cfg.force);
        assert!(cfg.bits);
    }

    #[test]
    fn init_writes_default_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg, PipeviewConfig::default());
        assert!(path.exists());

        fs::write(&path, "interval_secs = 3.0\naverage_rate_window = 5\n").unwrap();
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg.average_rate_window, 5);
    }

    #[test]
    fn load_from_path_fills_missing_fields() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "format = \"%b %p\"\n").unwrap();
        let cfg = load_from_path(file.path()).unwrap();
        assert_eq!(cfg.format.as_deref(), Some("%b %p"));
        assert_eq!(cfg.interval_secs, 1.0);
        assert_eq!(cfg.average_rate_window, 30);
        assert_eq!(cfg.default_width, 80);
        assert!(!cfg.force);
    }

    #[test]
    fn load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn load_from_path_rejects_garbage() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "interval_secs = \"soon\"").unwrap();
        let err = load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }
}
