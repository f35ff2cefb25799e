//! Stable ordering of aggregated rows for presentation.
//!
//! Pivot rows sort by label, total or any bucket key. Ties keep fold order
//! because every sort here is stable. Name comparison uses a Russian-aware
//! collation key: case is ignored and `ё` sorts as `е`.

use super::drilldown::{DrilldownRow, DrilldownView};
use super::pivot::PivotRow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Total,
    /// A time bucket key such as `2026-03` or `2026-Q1`.
    Bucket(String),
}

impl SortField {
    /// `name`, `total`, or anything else taken as a bucket key.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "name" => SortField::Name,
            "total" | "" => SortField::Total,
            key => SortField::Bucket(key.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, SortField::Name)
    }

    pub fn default_direction(&self) -> SortDirection {
        if self.is_numeric() {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortField::Name => write!(f, "name"),
            SortField::Total => write!(f, "total"),
            SortField::Bucket(key) => write!(f, "{}", key),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Column-header sort state of a table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        SortState { field: SortField::Total, direction: SortDirection::Desc }
    }
}

impl SortState {
    /// Same field flips direction; a new field starts from its default direction.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.reversed();
        } else {
            self.direction = field.default_direction();
            self.field = field;
        }
    }

    pub fn apply(&self, rows: &mut [PivotRow]) {
        sort_rows(rows, &self.field, self.direction);
    }
}

/// Lowercased form with `ё` folded into `е`.
pub fn collation_key(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .collect()
}

pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Stable sort of pivot rows. A missing bucket counts as 0.
pub fn sort_rows(rows: &mut [PivotRow], field: &SortField, direction: SortDirection) {
    match field {
        SortField::Name => rows.sort_by(|a, b| directed(compare_names(&a.label, &b.label), direction)),
        SortField::Total => rows.sort_by(|a, b| directed(a.total.total_cmp(&b.total), direction)),
        SortField::Bucket(key) => rows.sort_by(|a, b| {
            let left = a.buckets.get(key).copied().unwrap_or(0.0);
            let right = b.buckets.get(key).copied().unwrap_or(0.0);
            directed(left.total_cmp(&right), direction)
        }),
    }
}

/// Default ordering of a drilldown view.
///
/// Summary views (company, department) put the biggest totals first; the
/// others read as a directory ordered by scope name, then row name.
pub fn sort_drilldown(rows: &mut [DrilldownRow], view: DrilldownView) {
    if view.is_summary() {
        rows.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
    } else {
        rows.sort_by(|a, b| compare_names(&a.scope_name, &b.scope_name).then_with(|| compare_names(&a.name, &b.name)));
    }
}
