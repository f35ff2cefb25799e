//! Normalisation of collaborator records into allocated observations.
//!
//! For every reportable monthly plan, each `(plan, user)` hour aggregate is
//! split across the plan's companies with the plan's distribution type. The
//! result is one [`Fact`] per `(plan, user, company)` carrying the company's
//! share of hours, planned hours and tasks. Allocation happens here, once,
//! before any grouping, so coarser roll-ups never count a multi-company plan
//! twice.

use super::dimension::JoinRecord;
use super::distribution;
use super::metric::Observation;
use super::plan::{Dataset, InfrastructureCounts, Lookups, Plan, PlanLevel, PlanStatus, safe_number};
use chrono::NaiveDate;
use std::collections::HashMap;

/// One allocated observation with its join references.
#[derive(Debug, Clone)]
pub struct Fact<'a> {
    pub plan: &'a Plan,
    pub record: JoinRecord<'a>,
    pub date: NaiveDate,
    pub share: f64,
    pub observation: Observation,
    pub rate: Option<f64>,
}

/// Whether a plan takes part in reports at all.
pub fn is_reportable(plan: &Plan, statuses: &[PlanStatus]) -> bool {
    plan.level == PlanLevel::Monthly && statuses.contains(&plan.status) && plan.period_date().is_some()
}

/// Builds allocated facts for every reportable plan, in input order.
pub fn collect_facts<'a>(dataset: &'a Dataset, lookups: &Lookups<'a>, statuses: &[PlanStatus]) -> Vec<Fact<'a>> {
    let mut infrastructure_cache: HashMap<(i32, u32), HashMap<String, InfrastructureCounts>> = HashMap::new();
    let mut facts = Vec::new();

    for plan in &dataset.plans {
        if !is_reportable(plan, statuses) {
            continue;
        }
        let Some(date) = plan.period_date() else {
            continue;
        };
        let month = plan.month.unwrap_or(1);
        let infrastructure = infrastructure_cache
            .entry((plan.year, month))
            .or_insert_with(|| dataset.infrastructure_for(plan.year, month));

        let associations = lookups.plan_companies.get(plan.id.as_str()).cloned().unwrap_or_default();
        let company_ids: Vec<&str> = associations.iter().map(|pc| pc.company_id.as_str()).collect();
        let shares = distribution::shares(&company_ids, infrastructure, &plan.distribution());

        // A plan without companies is still counted, under the unknown company.
        let targets: Vec<(Option<&'a str>, Option<&'a str>, f64)> = if associations.is_empty() {
            vec![(None, None, 1.0)]
        } else {
            associations
                .iter()
                .copied()
                .zip(shares.iter())
                .map(|(pc, (_, share))| (Some(pc.company_id.as_str()), pc.company_name.as_deref(), *share))
                .collect()
        };

        let measure = lookups.measure_of(plan);
        let process_id = measure.and_then(|m| m.process_id.as_deref());
        let rows = lookups.task_hours.get(plan.id.as_str()).cloned().unwrap_or_default();
        let planned = safe_number(plan.planned_hours.unwrap_or(0.0));

        for (company_id, company_name, share) in targets {
            let base = JoinRecord {
                plan_id: plan.id.as_str(),
                measure_id: plan.measure_id.as_deref(),
                process_id,
                company_id,
                company_name,
                department_id: plan.department_id.as_deref(),
                user_id: None,
            };
            let rate = lookups.rate_for(company_id);

            if rows.is_empty() {
                if planned > 0.0 {
                    facts.push(Fact {
                        plan,
                        record: base,
                        date,
                        share,
                        observation: Observation { hours_actual: 0.0, hours_planned: planned * share, task_count: 0.0 },
                        rate,
                    });
                }
                continue;
            }

            let planned_per_row = planned / rows.len() as f64;
            for row in rows.iter().copied() {
                let user_id = row.user_id.as_deref();
                let department_id = match lookups.user(user_id) {
                    Some(user) => user.department_id.as_deref(),
                    None if user_id.is_none() => plan.department_id.as_deref(),
                    None => None,
                };
                facts.push(Fact {
                    plan,
                    record: JoinRecord { user_id, department_id, ..base },
                    date,
                    share,
                    observation: Observation {
                        hours_actual: safe_number(row.total_spent_hours) * share,
                        hours_planned: planned_per_row * share,
                        task_count: row.tasks_count as f64 * share,
                    },
                    rate,
                });
            }
        }
    }

    tracing::debug!(plans = dataset.plans.len(), facts = facts.len(), "collected allocated facts");
    facts
}
