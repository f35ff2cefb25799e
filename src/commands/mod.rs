//! Command-line interface of planboard.
//!
//! Every subcommand lives in its own module with a clap `Args` struct and a
//! `cmd` function. Report commands share [`DataArgs`] to pick where the
//! dataset comes from:
//!
//! 1. `--data <file.json>` when given
//! 2. the `dataset` path from the configuration
//! 3. the local SQLite store filled by `planboard import`

pub mod drilldown;
pub mod export;
pub mod import;
pub mod init;
pub mod periods;
pub mod pivot;
pub mod shares;

use crate::{
    db::snapshots::Snapshots,
    libs::{config::Config, messages::Message, plan::Dataset},
    msg_bail_anyhow, msg_debug,
};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Save default settings")]
    Init(init::InitArgs),
    #[command(about = "Import a JSON dataset into the local store", arg_required_else_help = true)]
    Import(import::ImportArgs),
    #[command(about = "Build a pivot report")]
    Pivot(pivot::PivotArgs),
    #[command(about = "Break one month or quarter down by a single dimension")]
    Drilldown(drilldown::DrilldownArgs),
    #[command(about = "Show how a plan's hours are split between its companies", arg_required_else_help = true)]
    Shares(shares::SharesArgs),
    #[command(about = "List months with reportable work")]
    Periods(periods::PeriodsArgs),
    #[command(about = "Export a report to CSV, JSON or Excel")]
    Export(export::ExportArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Import(args) => import::cmd(args),
            Commands::Pivot(args) => pivot::cmd(args),
            Commands::Drilldown(args) => drilldown::cmd(args),
            Commands::Shares(args) => shares::cmd(args),
            Commands::Periods(args) => periods::cmd(args),
            Commands::Export(args) => export::cmd(args),
        }
    }
}

#[derive(Debug, Args, Clone, Default)]
pub struct DataArgs {
    /// JSON dataset to report on instead of the local store
    #[arg(long)]
    pub data: Option<PathBuf>,
}

impl DataArgs {
    pub fn load(&self, config: &Config) -> Result<Dataset> {
        let path = self.data.clone().or_else(|| config.dataset.clone());
        let dataset = match path {
            Some(path) => {
                msg_debug!(format!("Reading dataset from {}", path.display()));
                Dataset::from_json_file(&path).map_err(|e| {
                    crate::msg_error_anyhow!(Message::DatasetLoadFailed(path.display().to_string(), e.to_string()))
                })?
            }
            None => {
                let store = Snapshots::new()?;
                if store.is_empty()? {
                    msg_bail_anyhow!(Message::StoreEmpty);
                }
                store.load()?
            }
        };
        tracing::debug!(plans = dataset.plans.len(), task_hours = dataset.task_hours.len(), "dataset loaded");
        Ok(dataset)
    }
}
