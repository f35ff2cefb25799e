use super::DataArgs;
use crate::{
    libs::{config::Config, distribution, formatter::format_number, messages::Message, view::View},
    msg_bail_anyhow, msg_print, msg_warning,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SharesArgs {
    #[command(flatten)]
    source: DataArgs,

    /// Monthly plan id
    #[arg(short, long)]
    plan: String,
}

pub fn cmd(args: SharesArgs) -> Result<()> {
    let config = Config::read()?;
    let dataset = args.source.load(&config)?;
    let lookups = dataset.lookups();

    let Some(plan) = lookups.plans.get(args.plan.as_str()).copied() else {
        msg_bail_anyhow!(Message::PlanNotFound(args.plan));
    };
    let Some(month) = plan.month.filter(|_| plan.period_date().is_some()) else {
        msg_bail_anyhow!(Message::PlanNotMonthly(args.plan));
    };

    let company_ids: Vec<&str> = lookups
        .plan_companies
        .get(plan.id.as_str())
        .map(|list| list.iter().map(|pc| pc.company_id.as_str()).collect())
        .unwrap_or_default();
    if company_ids.is_empty() {
        msg_warning!(Message::PlanWithoutCompanies(plan.id.clone()));
        return Ok(());
    }

    let (total_hours, _) = lookups.plan_totals(&plan.id);
    let infrastructure = dataset.infrastructure_for(plan.year, month);
    let distribution_type = plan.distribution();
    let parts = distribution::distribute_hours(total_hours, &company_ids, &infrastructure, &distribution_type);

    msg_print!(
        Message::SharesHeader {
            plan_id: plan.id.clone(),
            distribution: distribution_type.to_string(),
            total_hours: format_number(total_hours, 2),
        },
        true
    );
    let names = |company_id: &str| -> String {
        lookups
            .companies
            .get(company_id)
            .map(|c| c.name.clone())
            .or_else(|| {
                lookups
                    .plan_companies
                    .get(plan.id.as_str())
                    .and_then(|list| list.iter().find(|pc| pc.company_id == company_id))
                    .and_then(|pc| pc.company_name.clone())
            })
            .unwrap_or_default()
    };
    View::shares(&parts, &names)
}
