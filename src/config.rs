//! TOML configuration for the dashboard.
//!
//! Every key is optional:
//!
//! ```toml
//! # penguin-lens.toml
//! [data]
//! path = "data/penguins.csv"
//!
//! [controls]
//! bin_count_default = 20
//! bin_count_min = 5
//! bin_count_max = 100
//!
//! [charts]
//! primary_bins = 30
//! scatter_size_max = 6.0
//! kde_points = 200
//!
//! [tables]
//! grid_source = "filtered"
//!
//! [window]
//! width = 1200.0
//! height = 800.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::sinks::table::TableSource;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "penguin-lens.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub controls: ControlsConfig,
    pub charts: ChartsConfig,
    pub tables: TablesConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Dataset file (`.csv`, `.json` or `.parquet`).
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/penguins.csv"),
        }
    }
}

/// Range and default of the bin-count slider.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub bin_count_default: usize,
    pub bin_count_min: usize,
    pub bin_count_max: usize,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            bin_count_default: 20,
            bin_count_min: 5,
            bin_count_max: 100,
        }
    }
}

impl ControlsConfig {
    pub fn clamp_bin_count(&self, n: usize) -> usize {
        n.clamp(self.bin_count_min, self.bin_count_max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Fixed bin count of the primary histogram.
    pub primary_bins: usize,
    /// Largest scatter marker radius, reached by the longest bill.
    pub scatter_size_max: f32,
    /// Sample points per density curve.
    pub kde_points: usize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            primary_bins: 30,
            scatter_size_max: 6.0,
            kde_points: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// What the second grid shows.
    pub grid_source: TableSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Use `explicit` if given, else [`DEFAULT_CONFIG_FILE`] if it exists,
    /// else built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                log::info!("Using configuration from {}", path.display());
                Self::from_file(path)
            }
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    log::info!("Using configuration from {}", fallback.display());
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let c = &self.controls;
        if c.bin_count_min == 0 {
            bail!("controls.bin_count_min must be at least 1");
        }
        if c.bin_count_min > c.bin_count_max {
            bail!(
                "controls.bin_count_min ({}) exceeds bin_count_max ({})",
                c.bin_count_min,
                c.bin_count_max
            );
        }
        if !(c.bin_count_min..=c.bin_count_max).contains(&c.bin_count_default) {
            bail!(
                "controls.bin_count_default ({}) outside [{}, {}]",
                c.bin_count_default,
                c.bin_count_min,
                c.bin_count_max
            );
        }
        if self.charts.primary_bins == 0 {
            bail!("charts.primary_bins must be at least 1");
        }
        if self.charts.kde_points < 2 {
            bail!("charts.kde_points must be at least 2");
        }
        if !(self.charts.scatter_size_max > 0.0) {
            bail!("charts.scatter_size_max must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [data]
            path = "penguins.parquet"

            [controls]
            bin_count_default = 25
            bin_count_min = 10
            bin_count_max = 50

            [charts]
            primary_bins = 40
            scatter_size_max = 8.0
            kde_points = 100

            [tables]
            grid_source = "full"

            [window]
            width = 1600.0
            height = 900.0
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.data.path, PathBuf::from("penguins.parquet"));
        assert_eq!(config.controls.bin_count_default, 25);
        assert_eq!(config.controls.clamp_bin_count(3), 10);
        assert_eq!(config.controls.clamp_bin_count(80), 50);
        assert_eq!(config.charts.primary_bins, 40);
        assert_eq!(config.charts.kde_points, 100);
        assert_eq!(config.tables.grid_source, TableSource::Full);
        assert_eq!(config.window.width, 1600.0);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [controls]
            bin_count_default = 30
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.controls.bin_count_default, 30);
        assert_eq!(config.controls.bin_count_min, 5);
        assert_eq!(config.controls.bin_count_max, 100);
        assert_eq!(config.charts.primary_bins, 30);
        assert_eq!(config.tables.grid_source, TableSource::Filtered);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let toml = r#"
            [controls]
            bin_count_min = 50
            bin_count_max = 10
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_default_outside_range_rejected() {
        let toml = r#"
            [controls]
            bin_count_default = 500
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("penguin-lens.toml");
        std::fs::write(&path, "[charts]\nprimary_bins = 12\n").unwrap();

        let config = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.charts.primary_bins, 12);
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
