//! Splitting a multi-company plan's hours among its companies.
//!
//! A monthly plan may be associated with several companies. Its hours are
//! divided between them according to the plan's [`DistributionType`]:
//!
//! ```text
//! even                     share = 1 / N
//! infrastructure_weighted  share = (servers + workstations) / Σ(servers + workstations)
//! by_servers               share = servers / Σ servers
//! by_workstations          share = workstations / Σ workstations
//! ```
//!
//! Weighted splits fall back to `even` when every associated company has a
//! zero weight for the period, and unknown tags are split evenly as well, so
//! the shares of one plan always add up to 1.
//!
//! Every report view calls [`shares`] (or [`share`]) instead of recomputing
//! weights inline.

use super::formatter::round2;
use super::plan::InfrastructureCounts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DistributionType {
    #[default]
    Even,
    InfrastructureWeighted,
    ByServers,
    ByWorkstations,
    /// Tag this build does not know; split evenly.
    Other(String),
}

impl DistributionType {
    pub fn as_str(&self) -> &str {
        match self {
            DistributionType::Even => "even",
            DistributionType::InfrastructureWeighted => "infrastructure_weighted",
            DistributionType::ByServers => "by_servers",
            DistributionType::ByWorkstations => "by_workstations",
            DistributionType::Other(tag) => tag,
        }
    }

    /// Allocation weight of one company, `None` for non-weighted types.
    fn weight(&self, counts: Option<&InfrastructureCounts>) -> Option<f64> {
        let counts = counts.copied().unwrap_or_default();
        match self {
            DistributionType::InfrastructureWeighted => {
                Some(counts.servers_count as f64 + counts.workstations_count as f64)
            }
            DistributionType::ByServers => Some(counts.servers_count as f64),
            DistributionType::ByWorkstations => Some(counts.workstations_count as f64),
            DistributionType::Even | DistributionType::Other(_) => None,
        }
    }
}

impl From<&str> for DistributionType {
    fn from(tag: &str) -> Self {
        match tag.trim() {
            "" | "even" => DistributionType::Even,
            "infrastructure_weighted" => DistributionType::InfrastructureWeighted,
            "by_servers" => DistributionType::ByServers,
            "by_workstations" => DistributionType::ByWorkstations,
            other => DistributionType::Other(other.to_string()),
        }
    }
}

impl From<String> for DistributionType {
    fn from(tag: String) -> Self {
        DistributionType::from(tag.as_str())
    }
}

impl From<DistributionType> for String {
    fn from(value: DistributionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shares of every company associated with a plan, in input order.
///
/// Returns an empty list for a plan without companies.
pub fn shares<S: AsRef<str>>(
    company_ids: &[S],
    infrastructure: &HashMap<String, InfrastructureCounts>,
    distribution_type: &DistributionType,
) -> Vec<(String, f64)> {
    let n = company_ids.len();
    if n == 0 {
        return Vec::new();
    }

    let even = || {
        company_ids
            .iter()
            .map(|id| (id.as_ref().to_string(), 1.0 / n as f64))
            .collect::<Vec<_>>()
    };

    if let DistributionType::Other(tag) = distribution_type {
        tracing::warn!(distribution_type = %tag, "unknown distribution type, splitting evenly");
    }

    let weights: Option<Vec<f64>> = company_ids
        .iter()
        .map(|id| distribution_type.weight(infrastructure.get(id.as_ref())))
        .collect();

    let Some(weights) = weights else {
        return even();
    };

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        tracing::debug!(%distribution_type, companies = n, "no infrastructure weight, splitting evenly");
        return even();
    }

    company_ids
        .iter()
        .zip(weights)
        .map(|(id, weight)| (id.as_ref().to_string(), weight / total))
        .collect()
}

/// Fraction in `[0, 1]` of a plan's hours attributed to `company_id`.
///
/// A company that is not associated with the plan gets 0.
pub fn share<S: AsRef<str>>(
    company_id: &str,
    company_ids: &[S],
    infrastructure: &HashMap<String, InfrastructureCounts>,
    distribution_type: &DistributionType,
) -> f64 {
    shares(company_ids, infrastructure, distribution_type)
        .into_iter()
        .find(|(id, _)| id == company_id)
        .map(|(_, share)| share)
        .unwrap_or(0.0)
}

/// Absolute hours per company for a plan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompanyHourShare {
    pub company_id: String,
    pub share: f64,
    pub hours: f64,
}

/// Splits `total_hours` into hundredths of an hour per company.
///
/// Every company but the last receives `round2(total * share)`; the last one
/// receives the remainder so the rounded parts add up to `round2(total)`.
pub fn distribute_hours<S: AsRef<str>>(
    total_hours: f64,
    company_ids: &[S],
    infrastructure: &HashMap<String, InfrastructureCounts>,
    distribution_type: &DistributionType,
) -> Vec<CompanyHourShare> {
    let parts = shares(company_ids, infrastructure, distribution_type);
    let last = parts.len().saturating_sub(1);
    let mut distributed = 0.0;

    parts
        .into_iter()
        .enumerate()
        .map(|(i, (company_id, share))| {
            let hours = if i == last {
                round2(total_hours - distributed)
            } else {
                let hours = round2(total_hours * share);
                distributed += hours;
                hours
            };
            CompanyHourShare { company_id, share, hours }
        })
        .collect()
}
