use super::DataArgs;
use crate::{
    libs::{
        config::Config,
        drilldown::{self, DrilldownPeriod, DrilldownReport, DrilldownRequest, DrilldownView},
        messages::Message,
        view::View,
    },
    msg_error_anyhow, msg_info, msg_print,
};
use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Args;

/// Request options shared by `drilldown` and `export drilldown`.
#[derive(Debug, Args, Clone)]
pub struct DrilldownQuery {
    #[command(flatten)]
    pub source: DataArgs,

    #[arg(short, long)]
    pub year: Option<i32>,

    #[arg(short, long, conflicts_with = "quarter")]
    pub month: Option<u32>,

    #[arg(short, long)]
    pub quarter: Option<u32>,

    #[arg(short, long, value_enum, default_value = "process")]
    pub by: DrilldownView,
}

impl DrilldownQuery {
    pub fn request(&self, config: &Config) -> Result<DrilldownRequest> {
        let year = self.year.unwrap_or_else(|| Local::now().year());
        let period = DrilldownPeriod::from_parts(self.month, self.quarter)
            .map_err(|e| msg_error_anyhow!(Message::InvalidRequest(e.to_string())))?;
        let request =
            DrilldownRequest::new(year, period, self.by).with_statuses(config.report().reportable_statuses);
        request
            .report_period()
            .map_err(|e| msg_error_anyhow!(Message::InvalidRequest(e.to_string())))?;
        Ok(request)
    }

    pub fn run(&self, config: &Config) -> Result<DrilldownReport> {
        let request = self.request(config)?;
        let dataset = self.source.load(config)?;
        Ok(drilldown::aggregate(&dataset, &request)?)
    }
}

#[derive(Debug, Args)]
pub struct DrilldownArgs {
    #[command(flatten)]
    query: DrilldownQuery,

    #[arg(long)]
    json: bool,
}

pub fn cmd(args: DrilldownArgs) -> Result<()> {
    let config = Config::read()?;
    let report = args.query.run(&config)?;

    if args.json {
        msg_print!(serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if report.rows.is_empty() {
        msg_info!(Message::NoDrilldownRows(report.period_label.clone()));
        return Ok(());
    }

    msg_print!(
        Message::DrilldownHeader { view: report.by.title().to_string(), period: report.period_label.clone() },
        true
    );
    View::drilldown(&report, config.report().decimals)
}
