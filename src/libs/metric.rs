//! Conversion of allocated observations into the value of a report metric.
//!
//! The aggregators fold [`Tally`] accumulators and ask a [`Metric`] for the
//! number to show, so adding a metric means adding one arm to
//! [`Metric::value`]. Report totals are sums of the displayed cell values for
//! every metric; a KPI total is therefore a sum of percentages, and the plain
//! actual-over-planned ratio is reported separately.

use super::error::{ReportError, ReportResult};
use super::plan::safe_number;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Hours,
    Tasks,
    Planned,
    Cost,
    Kpi,
}

impl Metric {
    pub const ALL: [Metric; 5] = [Metric::Hours, Metric::Tasks, Metric::Planned, Metric::Cost, Metric::Kpi];

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Hours => "ч.",
            Metric::Tasks => "зад.",
            Metric::Planned => "план",
            Metric::Cost => "грн",
            Metric::Kpi => "%",
        }
    }

    /// Value of this metric for an accumulated tally.
    pub fn value(&self, tally: &Tally) -> f64 {
        match self {
            Metric::Hours => tally.hours,
            Metric::Tasks => tally.tasks,
            Metric::Planned => tally.planned,
            Metric::Cost => tally.cost,
            Metric::Kpi => kpi(tally.hours, tally.planned),
        }
    }
}

impl FromStr for Metric {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        match s.trim() {
            "hours" => Ok(Metric::Hours),
            "tasks" => Ok(Metric::Tasks),
            "planned" => Ok(Metric::Planned),
            "cost" => Ok(Metric::Cost),
            "kpi" => Ok(Metric::Kpi),
            other => Err(ReportError::UnknownMetric(other.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Metric::Hours => "hours",
            Metric::Tasks => "tasks",
            Metric::Planned => "planned",
            Metric::Cost => "cost",
            Metric::Kpi => "kpi",
        };
        write!(f, "{}", name)
    }
}

/// Raw, already allocated numbers of one observation.
///
/// `task_count` is fractional because allocation shares apply to it too.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Observation {
    pub hours_actual: f64,
    pub hours_planned: f64,
    pub task_count: f64,
}

/// Running sums of everything a metric may need.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Tally {
    pub hours: f64,
    pub planned: f64,
    pub tasks: f64,
    pub cost: f64,
}

impl Tally {
    /// Adds one observation; a missing hourly rate counts as 0.
    pub fn record(&mut self, observation: &Observation, rate: Option<f64>) {
        let hours = safe_number(observation.hours_actual);
        self.hours += hours;
        self.planned += safe_number(observation.hours_planned);
        self.tasks += safe_number(observation.task_count);
        self.cost += hours * rate.map(safe_number).unwrap_or(0.0);
    }

    pub fn merge(&mut self, other: &Tally) {
        self.hours += other.hours;
        self.planned += other.planned;
        self.tasks += other.tasks;
        self.cost += other.cost;
    }
}

/// Scalar value of `metric` for a single observation.
pub fn evaluate(metric: Metric, observation: &Observation, rate: Option<f64>) -> f64 {
    let mut tally = Tally::default();
    tally.record(observation, rate);
    metric.value(&tally)
}

/// Percentage of plan fulfilled; 0 when nothing was planned.
pub fn kpi(hours_actual: f64, hours_planned: f64) -> f64 {
    if hours_planned > 0.0 {
        let value = 100.0 * hours_actual / hours_planned;
        if value.is_finite() {
            return value;
        }
    }
    0.0
}
