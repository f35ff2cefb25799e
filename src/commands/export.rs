//! Report export command.
//!
//! Runs the same request as `pivot` or `drilldown` and writes the result to a
//! file instead of the terminal.
//!
//! ## Supported Export Formats
//!
//! - **CSV**: one row per report row plus a totals row
//! - **JSON**: the full response as returned by the engine
//! - **Excel**: a single sheet with a bold header row

use super::drilldown::DrilldownQuery;
use super::pivot::PivotQuery;
use crate::libs::{
    config::Config,
    export::{ExportFormat, Exporter},
};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportFormat,

    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum ExportTarget {
    Pivot {
        #[command(flatten)]
        query: PivotQuery,
        #[command(flatten)]
        output: OutputArgs,
    },
    Drilldown {
        #[command(flatten)]
        query: DrilldownQuery,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    target: ExportTarget,
}

pub fn cmd(args: ExportArgs) -> Result<()> {
    let config = Config::read()?;
    let decimals = config.report().decimals;

    match args.target {
        ExportTarget::Pivot { query, output } => {
            let response = query.run(&config)?;
            Exporter::new(output.format, output.output, "pivot")
                .with_decimals(decimals)
                .export_pivot(&response)
        }
        ExportTarget::Drilldown { query, output } => {
            let report = query.run(&config)?;
            Exporter::new(output.format, output.output, "drilldown")
                .with_decimals(decimals)
                .export_drilldown(&report)
        }
    }
}
