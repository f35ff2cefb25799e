//! Configuration management for planboard.
//!
//! Settings live in a JSON file (`config.json`) inside the platform data
//! directory resolved by [`DataStorage`]. A missing file is not an error:
//! [`Config::read`] returns defaults so every command works without setup.
//!
//! ## Structure
//!
//! - **report**: defaults for pivot requests (metric, time grain, grouping),
//!   display rounding and the plan statuses that count towards reports
//! - **dataset**: path of a JSON snapshot used when a command gets no `--data`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use planboard::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.dataset = Some("snapshot.json".into());
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::bucket::TimeGrain;
use super::data_storage::DataStorage;
use super::dimension::Dimension;
use super::metric::Metric;
use super::plan::PlanStatus;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Defaults applied to report requests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub default_metric: Metric,
    pub default_time_grain: TimeGrain,
    pub default_group_by: Vec<Dimension>,
    /// Decimal places shown in tables and exports.
    pub decimals: usize,
    pub reportable_statuses: Vec<PlanStatus>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            default_metric: Metric::Hours,
            default_time_grain: TimeGrain::Month,
            default_group_by: vec![Dimension::Company],
            decimals: 2,
            reportable_statuses: PlanStatus::REPORTABLE.to_vec(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,
}

impl Config {
    /// Loads the configuration, or defaults when no file exists yet.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Report settings with defaults filled in.
    pub fn report(&self) -> ReportConfig {
        self.report.clone().unwrap_or_default()
    }
}
