//! Saves default settings to the configuration file.
//!
//! Options that are not given keep their current value, so `init` can be
//! re-run to change a single setting.

use crate::{
    libs::{
        bucket::TimeGrain,
        config::Config,
        dimension::Dimension,
        messages::Message,
        metric::Metric,
        plan::PlanStatus,
    },
    msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Default JSON dataset for report commands
    #[arg(long)]
    dataset: Option<PathBuf>,

    #[arg(long, value_enum)]
    metric: Option<Metric>,

    #[arg(long, value_enum)]
    time_grain: Option<TimeGrain>,

    /// Default grouping, e.g. `company,process`
    #[arg(long)]
    group_by: Option<String>,

    /// Decimal places shown in tables and exports
    #[arg(long)]
    decimals: Option<usize>,

    /// Plan statuses counted in reports
    #[arg(long, value_enum, value_delimiter = ',')]
    statuses: Vec<PlanStatus>,

    /// Reset every setting to its default first
    #[arg(long)]
    reset: bool,
}

pub fn cmd(args: InitArgs) -> Result<()> {
    let mut config = if args.reset { Config::default() } else { Config::read()? };
    let mut report = config.report();

    if let Some(metric) = args.metric {
        report.default_metric = metric;
    }
    if let Some(time_grain) = args.time_grain {
        report.default_time_grain = time_grain;
    }
    if let Some(group_by) = args.group_by.as_deref() {
        report.default_group_by = Dimension::parse_list(group_by)?;
    }
    if let Some(decimals) = args.decimals {
        report.decimals = decimals;
    }
    if !args.statuses.is_empty() {
        report.reportable_statuses = args.statuses;
    }
    config.report = Some(report);

    if let Some(dataset) = args.dataset {
        msg_info!(Message::ConfigDatasetSet(dataset.display().to_string()));
        config.dataset = Some(dataset);
    }

    config.save()?;
    msg_success!(Message::ConfigSaved);
    Ok(())
}
