//! Planning data model supplied by the storage collaborators.
//!
//! Records arrive already joined and pre-aggregated: task hours are summed
//! per `(plan, user)` upstream and the engine never re-sums raw task rows.
//! A [`Dataset`] is an immutable snapshot of everything one report needs;
//! [`Lookups`] indexes it by id for the resolvers.

use super::distribution::DistributionType;
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Hierarchy level of a plan: annual → quarterly → monthly → weekly.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanLevel {
    Annual,
    Quarterly,
    Monthly,
    Weekly,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Draft,
    Submitted,
    Approved,
    Active,
    Completed,
    Failed,
    Returned,
}

impl PlanStatus {
    /// Statuses that count towards reports unless configured otherwise.
    pub const REPORTABLE: [PlanStatus; 2] = [PlanStatus::Active, PlanStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Submitted => "submitted",
            PlanStatus::Approved => "approved",
            PlanStatus::Active => "active",
            PlanStatus::Completed => "completed",
            PlanStatus::Failed => "failed",
            PlanStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Plan {
    pub id: String,
    pub level: PlanLevel,
    pub year: i32,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub quarter: Option<u32>,
    pub status: PlanStatus,
    #[serde(default)]
    pub distribution_type: Option<DistributionType>,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Measure ("procedure") the plan executes; process is reached through it.
    #[serde(default)]
    pub measure_id: Option<String>,
    /// Department owning the parent quarterly plan.
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub planned_hours: Option<f64>,
}

impl Plan {
    /// Monthly plan skeleton, mostly useful in tests and fixtures.
    pub fn monthly(id: &str, year: i32, month: u32, status: PlanStatus) -> Self {
        Plan {
            id: id.to_string(),
            level: PlanLevel::Monthly,
            year,
            month: Some(month),
            quarter: Some((month + 2) / 3),
            status,
            distribution_type: None,
            parent_id: None,
            measure_id: None,
            department_id: None,
            planned_hours: None,
        }
    }

    /// First day of the month the plan covers; `None` for non-monthly plans
    /// or an impossible month.
    pub fn period_date(&self) -> Option<NaiveDate> {
        match (self.level, self.month) {
            (PlanLevel::Monthly, Some(month)) => NaiveDate::from_ymd_opt(self.year, month, 1),
            _ => None,
        }
    }

    pub fn distribution(&self) -> DistributionType {
        self.distribution_type.clone().unwrap_or_default()
    }
}

/// Pre-aggregated task hours of one user on one plan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskHours {
    pub plan_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub total_spent_hours: f64,
    pub tasks_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanCompany {
    pub plan_id: String,
    pub company_id: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct InfrastructureCounts {
    pub servers_count: u32,
    pub workstations_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InfrastructureSnapshot {
    pub company_id: String,
    pub period_year: i32,
    pub period_month: u32,
    pub servers_count: u32,
    pub workstations_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Department {
    pub department_id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Measure {
    pub measure_id: String,
    pub name: String,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub process_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Process {
    pub process_id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Company {
    pub company_id: String,
    pub name: String,
    #[serde(default)]
    pub rate_per_hour: Option<f64>,
}

/// Immutable snapshot of collaborator data for one reporting request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    #[serde(default)]
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub task_hours: Vec<TaskHours>,
    #[serde(default)]
    pub plan_companies: Vec<PlanCompany>,
    #[serde(default)]
    pub infrastructure: Vec<InfrastructureSnapshot>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub processes: Vec<Process>,
    #[serde(default)]
    pub companies: Vec<Company>,
}

impl Dataset {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&raw)?;
        Ok(dataset)
    }

    pub fn lookups(&self) -> Lookups<'_> {
        Lookups::new(self)
    }

    /// Infrastructure counts per company for one calendar month.
    pub fn infrastructure_for(&self, year: i32, month: u32) -> HashMap<String, InfrastructureCounts> {
        self.infrastructure
            .iter()
            .filter(|i| i.period_year == year && i.period_month == month)
            .map(|i| {
                (
                    i.company_id.clone(),
                    InfrastructureCounts {
                        servers_count: i.servers_count,
                        workstations_count: i.workstations_count,
                    },
                )
            })
            .collect()
    }
}

/// Id-indexed views over a [`Dataset`].
pub struct Lookups<'a> {
    pub plans: HashMap<&'a str, &'a Plan>,
    pub users: HashMap<&'a str, &'a User>,
    pub departments: HashMap<&'a str, &'a Department>,
    pub measures: HashMap<&'a str, &'a Measure>,
    pub processes: HashMap<&'a str, &'a Process>,
    pub companies: HashMap<&'a str, &'a Company>,
    /// Company associations per plan in input order.
    pub plan_companies: HashMap<&'a str, Vec<&'a PlanCompany>>,
    /// Task-hour aggregates per plan in input order.
    pub task_hours: HashMap<&'a str, Vec<&'a TaskHours>>,
}

impl<'a> Lookups<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        let mut plan_companies: HashMap<&str, Vec<&PlanCompany>> = HashMap::new();
        for pc in &dataset.plan_companies {
            let list = plan_companies.entry(pc.plan_id.as_str()).or_default();
            // Duplicate edges would otherwise split a plan one extra way.
            if !list.iter().any(|existing| existing.company_id == pc.company_id) {
                list.push(pc);
            }
        }

        let mut task_hours: HashMap<&str, Vec<&TaskHours>> = HashMap::new();
        for th in &dataset.task_hours {
            task_hours.entry(th.plan_id.as_str()).or_default().push(th);
        }

        Lookups {
            plans: dataset.plans.iter().map(|p| (p.id.as_str(), p)).collect(),
            users: dataset.users.iter().map(|u| (u.user_id.as_str(), u)).collect(),
            departments: dataset.departments.iter().map(|d| (d.department_id.as_str(), d)).collect(),
            measures: dataset.measures.iter().map(|m| (m.measure_id.as_str(), m)).collect(),
            processes: dataset.processes.iter().map(|p| (p.process_id.as_str(), p)).collect(),
            companies: dataset.companies.iter().map(|c| (c.company_id.as_str(), c)).collect(),
            plan_companies,
            task_hours,
        }
    }

    pub fn measure_of(&self, plan: &Plan) -> Option<&'a Measure> {
        plan.measure_id.as_deref().and_then(|id| self.measures.get(id).copied())
    }

    pub fn user(&self, user_id: Option<&str>) -> Option<&'a User> {
        user_id.and_then(|id| self.users.get(id).copied())
    }

    pub fn rate_for(&self, company_id: Option<&str>) -> Option<f64> {
        company_id
            .and_then(|id| self.companies.get(id))
            .and_then(|c| c.rate_per_hour)
    }

    /// Plan totals: unsplit hours and task count summed over its users.
    pub fn plan_totals(&self, plan_id: &str) -> (f64, f64) {
        self.task_hours
            .get(plan_id)
            .map(|rows| {
                rows.iter().fold((0.0, 0.0), |(hours, tasks), row| {
                    (hours + safe_number(row.total_spent_hours), tasks + row.tasks_count as f64)
                })
            })
            .unwrap_or((0.0, 0.0))
    }
}

/// Treats NaN, infinities and negatives as zero so bad input never poisons a sum.
pub fn safe_number(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
