//! Display text of every [`Message`].
//!
//! All user-facing wording is kept in this one match so that call sites stay
//! free of string literals and wording changes touch a single file.
//!
//! ```rust
//! use planboard::libs::messages::Message;
//!
//! assert_eq!(Message::ExportCompleted("out.csv".into()).to_string(), "Export completed successfully: out.csv");
//! ```

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDatasetSet(path) => format!("Default dataset: {}", path),
            Message::ConfigLoadFailed(error) => format!("Failed to load configuration: {}", error),

            // === DATASET MESSAGES ===
            Message::DatasetLoaded { source, plans, task_hours } => {
                format!("Loaded {} plans and {} task-hour records from {}", plans, task_hours, source)
            }
            Message::DatasetLoadFailed(source, error) => format!("Failed to load dataset from {}: {}", source, error),
            Message::DatasetImported { plans, task_hours, companies } => format!(
                "Imported {} plans, {} task-hour records and {} companies",
                plans, task_hours, companies
            ),
            Message::DatasetEmpty => "The dataset contains no plans".to_string(),
            Message::StoreEmpty => "The local store is empty. Run `planboard import <file>` first".to_string(),

            // === REPORT MESSAGES ===
            Message::InvalidRequest(error) => format!("Invalid report request: {}", error),
            Message::PivotHeader { group_by, metric, period } => {
                format!("Pivot by {} · {} · {}", group_by, metric, period)
            }
            Message::PivotStats { total_hours, planned_hours, total_tasks, kpi, companies, employees } => format!(
                "Hours: {} | Planned: {} | Tasks: {} | KPI: {} | Companies: {} | Employees: {}",
                total_hours, planned_hours, total_tasks, kpi, companies, employees
            ),
            Message::NoPivotRows(period) => format!("No reportable hours for {}", period),
            Message::UnknownSortBucket(key) => format!("Bucket '{}' is not part of this report, sorting by total", key),
            Message::DrilldownHeader { view, period } => format!("Breakdown by {} · {}", view, period),
            Message::NoDrilldownRows(period) => format!("No active or completed plans for {}", period),

            // === ALLOCATION MESSAGES ===
            Message::PlanNotFound(id) => format!("Plan '{}' not found", id),
            Message::PlanNotMonthly(id) => format!("Plan '{}' is not a monthly plan", id),
            Message::SharesHeader { plan_id, distribution, total_hours } => {
                format!("Plan {} · {} · {} h", plan_id, distribution, total_hours)
            }
            Message::PlanWithoutCompanies(id) => format!("Plan '{}' has no associated companies", id),

            // === PERIOD MESSAGES ===
            Message::PeriodsHeader => "Months with reportable work".to_string(),
            Message::NoPeriods => "No months with reportable work".to_string(),

            // === EXPORT MESSAGES ===
            Message::ExportCompleted(path) => format!("Export completed successfully: {}", path),
            Message::ExportFailed(error) => format!("Export failed: {}", error),
        };
        write!(f, "{}", s)
    }
}
