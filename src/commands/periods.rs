use super::DataArgs;
use crate::{
    libs::{config::Config, drilldown::period_overview, messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct PeriodsArgs {
    #[command(flatten)]
    source: DataArgs,
}

pub fn cmd(args: PeriodsArgs) -> Result<()> {
    let config = Config::read()?;
    let report = config.report();
    let dataset = args.source.load(&config)?;
    let periods = period_overview(&dataset, &report.reportable_statuses);

    if periods.is_empty() {
        msg_info!(Message::NoPeriods);
        return Ok(());
    }
    msg_print!(Message::PeriodsHeader, true);
    View::periods(&periods, report.decimals)
}
