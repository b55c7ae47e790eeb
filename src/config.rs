use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::{Epoch, Frequency};
use crate::forecast::Model;
use crate::stats::rolling::WINDOW_OPTIONS;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "FUEL_DASHBOARD_CONFIG";
/// Environment variable naming the CSV to open at startup.
pub const CSV_ENV: &str = "FUEL_DASHBOARD_CSV";
const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

pub const THRESHOLD_MIN: f64 = 0.5;
pub const THRESHOLD_MAX: f64 = 4.0;

/// Startup defaults for the dashboard widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub csv_path: Option<PathBuf>,
    pub window: usize,
    pub threshold: f64,
    pub frequency: Frequency,
    pub epoch: Epoch,
    pub models: Vec<Model>,
    pub shared_heatmap_scale: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            window: 12,
            threshold: 2.0,
            frequency: Frequency::Monthly,
            epoch: Epoch::All,
            models: vec![Model::Naive],
            shared_heatmap_scale: true,
        }
    }
}

impl DashboardConfig {
    /// Where the configuration lives: `$FUEL_DASHBOARD_CONFIG`, else
    /// `dashboard.json` in the working directory.
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load from [`DashboardConfig::path`]. A missing file gives the
    /// defaults; an unreadable one is logged and also gives the defaults.
    pub fn load() -> Self {
        let path = Self::path();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::read(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("Invalid dashboard config")?;
        Ok(config.sanitized())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("Failed to serialise config")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replace out-of-range values with the defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !WINDOW_OPTIONS.contains(&self.window) {
            log::warn!("Config window {} not in {WINDOW_OPTIONS:?}", self.window);
            self.window = defaults.window;
        }
        if !(THRESHOLD_MIN..=THRESHOLD_MAX).contains(&self.threshold) {
            log::warn!("Config threshold {} out of range", self.threshold);
            self.threshold = defaults.threshold;
        }
        let available = Model::available();
        self.models.retain(|m| available.contains(m));
        self.models.sort();
        self.models.dedup();
        self
    }

    /// CSV to open at startup: the CLI argument, else `$FUEL_DASHBOARD_CSV`,
    /// else the configured path.
    pub fn startup_csv(&self, cli_arg: Option<PathBuf>) -> Option<PathBuf> {
        cli_arg
            .or_else(|| std::env::var_os(CSV_ENV).map(PathBuf::from))
            .or_else(|| self.csv_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{ "window": 6, "epoch": "Post2020" }"#).unwrap();
        assert_eq!(config.window, 6);
        assert_eq!(config.epoch, Epoch::Post2020);
        assert_eq!(config.threshold, 2.0);
        assert_eq!(config.models, vec![Model::Naive]);
        assert!(config.shared_heatmap_scale);
    }

    #[test]
    fn out_of_range_values_fall_back() {
        let config =
            DashboardConfig::from_json(r#"{ "window": 5, "threshold": 9.0, "models": ["Naive", "Naive"] }"#)
                .unwrap();
        assert_eq!(config.window, 12);
        assert_eq!(config.threshold, 2.0);
        assert_eq!(config.models, vec![Model::Naive]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(DashboardConfig::from_json("{ window: }").is_err());
    }

    #[test]
    fn save_then_read() {
        let path = std::env::temp_dir().join(format!("fuel-dashboard-{}.json", std::process::id()));
        let config = DashboardConfig {
            window: 3,
            frequency: Frequency::Yearly,
            models: vec![Model::Naive, Model::SeasonalNaive],
            ..Default::default()
        };
        config.save(&path).unwrap();
        let back = DashboardConfig::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, config);
    }

    #[test]
    fn cli_argument_wins() {
        let config = DashboardConfig {
            csv_path: Some(PathBuf::from("configured.csv")),
            ..Default::default()
        };
        assert_eq!(
            config.startup_csv(Some(PathBuf::from("cli.csv"))),
            Some(PathBuf::from("cli.csv"))
        );
    }
}
