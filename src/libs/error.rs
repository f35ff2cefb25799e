//! Typed errors for malformed report requests.
//!
//! Data-quality gaps in collaborator records never produce an error; only
//! request parameters that cannot be interpreted do. These are raised before
//! any aggregation starts so the caller gets a specific message instead of
//! a silently wrong table.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("groupBy must contain at least one dimension")]
    EmptyGroupBy,

    #[error("unknown dimension '{0}' (expected company, department, employee, process, measure or category)")]
    UnknownDimension(String),

    #[error("unknown metric '{0}' (expected hours, tasks, planned, cost or kpi)")]
    UnknownMetric(String),

    #[error("unknown time grain '{0}' (expected month or quarter)")]
    UnknownTimeGrain(String),

    #[error("unknown period type '{0}' (expected month, quarter or year)")]
    UnknownPeriodType(String),

    #[error("year {0} is outside the supported range 2000..=2100")]
    InvalidYear(i32),

    #[error("invalid {period_type} value: {value:?}")]
    InvalidPeriodValue { period_type: String, value: Option<u32> },

    #[error("drilldown reports require a month or quarter period")]
    UnsupportedDrilldownPeriod,

    #[error("unknown drilldown dimension '{0}' (expected process, procedure, company, employee or department)")]
    UnknownDrilldownDimension(String),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
