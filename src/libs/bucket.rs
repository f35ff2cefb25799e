//! Time slicing of observations into month or quarter buckets.
//!
//! Bucket keys sort lexicographically in chronological order:
//! months are `YYYY-MM` (`2026-01`), quarters are `YYYY-Qn` (`2026-Q1`).
//! Quarters are calendar quarters (Jan–Mar, Apr–Jun, Jul–Sep, Oct–Dec).

use super::error::{ReportError, ReportResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MONTH_SHORT_RU: [&str; 12] = [
    "Янв", "Фев", "Мар", "Апр", "Май", "Июн", "Июл", "Авг", "Сен", "Окт", "Ноя", "Дек",
];

pub const MONTH_NAMES_RU: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь",
    "Июль", "Август", "Сентябрь", "Октябрь", "Ноябрь", "Декабрь",
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimeGrain {
    #[default]
    Month,
    Quarter,
}

impl FromStr for TimeGrain {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        match s.trim() {
            "month" => Ok(TimeGrain::Month),
            "quarter" => Ok(TimeGrain::Quarter),
            other => Err(ReportError::UnknownTimeGrain(other.to_string())),
        }
    }
}

impl fmt::Display for TimeGrain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimeGrain::Month => write!(f, "month"),
            TimeGrain::Quarter => write!(f, "quarter"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Month,
    Quarter,
    #[default]
    Year,
}

impl FromStr for PeriodType {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        match s.trim() {
            "month" => Ok(PeriodType::Month),
            "quarter" => Ok(PeriodType::Quarter),
            "year" => Ok(PeriodType::Year),
            other => Err(ReportError::UnknownPeriodType(other.to_string())),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PeriodType::Month => write!(f, "month"),
            PeriodType::Quarter => write!(f, "quarter"),
            PeriodType::Year => write!(f, "year"),
        }
    }
}

/// Bounding period of a report: a year, optionally narrowed to a month or quarter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub year: i32,
    pub period_type: PeriodType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_value: Option<u32>,
}

impl ReportPeriod {
    pub fn new(year: i32, period_type: PeriodType, period_value: Option<u32>) -> ReportResult<Self> {
        let period = ReportPeriod { year, period_type, period_value };
        period.validate()?;
        Ok(period)
    }

    pub fn year(year: i32) -> Self {
        ReportPeriod { year, period_type: PeriodType::Year, period_value: None }
    }

    pub fn month(year: i32, month: u32) -> Self {
        ReportPeriod { year, period_type: PeriodType::Month, period_value: Some(month) }
    }

    pub fn quarter(year: i32, quarter: u32) -> Self {
        ReportPeriod { year, period_type: PeriodType::Quarter, period_value: Some(quarter) }
    }

    pub fn validate(&self) -> ReportResult<()> {
        if !(2000..=2100).contains(&self.year) {
            return Err(ReportError::InvalidYear(self.year));
        }
        let valid = match self.period_type {
            PeriodType::Year => true,
            PeriodType::Month => matches!(self.period_value, Some(1..=12)),
            PeriodType::Quarter => matches!(self.period_value, Some(1..=4)),
        };
        if valid {
            Ok(())
        } else {
            Err(ReportError::InvalidPeriodValue {
                period_type: self.period_type.to_string(),
                value: self.period_value,
            })
        }
    }

    /// Calendar months covered by the period, ascending.
    pub fn months(&self) -> Vec<u32> {
        match (self.period_type, self.period_value) {
            (PeriodType::Month, Some(month)) => vec![month],
            (PeriodType::Quarter, Some(quarter)) => {
                let start = quarter.saturating_sub(1) * 3 + 1;
                vec![start, start + 1, start + 2]
            }
            _ => (1..=12).collect(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && self.months().contains(&date.month())
    }

    pub fn label(&self) -> String {
        match (self.period_type, self.period_value) {
            (PeriodType::Month, Some(month)) => {
                format!("{} {}", month_name(month), self.year)
            }
            (PeriodType::Quarter, Some(quarter)) => format!("Q{} {}", quarter, self.year),
            _ => self.year.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
}

impl TimeBucket {
    fn for_month(year: i32, month: u32) -> Self {
        TimeBucket {
            key: format!("{}-{:02}", year, month),
            label: MONTH_SHORT_RU
                .get(month.wrapping_sub(1) as usize)
                .map(|label| label.to_string())
                .unwrap_or_else(|| month.to_string()),
            month: Some(month),
            quarter: None,
        }
    }

    fn for_quarter(year: i32, quarter: u32) -> Self {
        TimeBucket {
            key: format!("{}-Q{}", year, quarter),
            label: format!("Q{}", quarter),
            month: None,
            quarter: Some(quarter),
        }
    }
}

/// Full Russian month name, empty for an out-of-range month.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES_RU.get(month.wrapping_sub(1) as usize).copied().unwrap_or("")
}

pub fn quarter_of(month: u32) -> u32 {
    (month + 2) / 3
}

/// Bucket of `date` at `grain`, or `None` when the date lies outside `period`.
pub fn bucket_for(date: NaiveDate, grain: TimeGrain, period: &ReportPeriod) -> Option<TimeBucket> {
    if !period.contains(date) {
        return None;
    }
    Some(match grain {
        TimeGrain::Month => TimeBucket::for_month(date.year(), date.month()),
        TimeGrain::Quarter => TimeBucket::for_quarter(date.year(), quarter_of(date.month())),
    })
}

/// Every bucket of the period at `grain`, chronologically ascending.
pub fn buckets_for_period(period: &ReportPeriod, grain: TimeGrain) -> Vec<TimeBucket> {
    let months = period.months();
    match grain {
        TimeGrain::Month => months.into_iter().map(|m| TimeBucket::for_month(period.year, m)).collect(),
        TimeGrain::Quarter => {
            let mut quarters: Vec<u32> = months.into_iter().map(quarter_of).collect();
            quarters.dedup();
            quarters.into_iter().map(|q| TimeBucket::for_quarter(period.year, q)).collect()
        }
    }
}
