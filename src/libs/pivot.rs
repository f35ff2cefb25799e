//! # Pivot Aggregator
//!
//! Folds allocated observations into a pivot table keyed by any ordered
//! combination of dimensions, with one column per time bucket.
//!
//! ## Features
//!
//! - **Composite rows**: one row per distinct tuple of dimension ids, labelled
//!   `"Company / Process"`
//! - **Zero-filled buckets**: every row carries a value for every bucket of the
//!   requested period
//! - **Plan-vs-actual**: planned hours are folded in the same pass and exposed
//!   as `plannedBuckets`/`plannedTotal`
//! - **Totals**: column totals and the grand total are sums of the row values
//!   for every metric, KPI included; the dataset-wide KPI ratio lives in
//!   [`PivotStats::kpi`]
//!
//! Rows come out in fold order (first observation first). Presentation order
//! is the job of [`crate::libs::sort`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use planboard::libs::pivot::{aggregate, PivotRequest};
//! use planboard::libs::bucket::ReportPeriod;
//! use planboard::libs::dimension::Dimension;
//! use planboard::libs::plan::Dataset;
//!
//! let dataset = Dataset::default();
//! let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company]);
//! let response = aggregate(&dataset, &request)?;
//! println!("{}", response.grand_total);
//! # Ok::<(), planboard::libs::error::ReportError>(())
//! ```

use super::bucket::{self, PeriodType, ReportPeriod, TimeBucket, TimeGrain};
use super::dimension::{self, Dimension, DimensionValue, JoinRecord};
use super::error::{ReportError, ReportResult};
use super::metric::{Metric, Tally};
use super::observation::{self, Fact};
use super::plan::{Dataset, Lookups, PlanStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Optional id filters; an empty list means "no restriction".
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PivotFilters {
    pub company_ids: Vec<String>,
    pub department_ids: Vec<String>,
    pub user_ids: Vec<String>,
    pub process_ids: Vec<String>,
    pub measure_ids: Vec<String>,
    pub categories: Vec<String>,
}

impl PivotFilters {
    pub fn is_empty(&self) -> bool {
        self.company_ids.is_empty()
            && self.department_ids.is_empty()
            && self.user_ids.is_empty()
            && self.process_ids.is_empty()
            && self.measure_ids.is_empty()
            && self.categories.is_empty()
    }

    /// Whether a record passes every non-empty filter. Missing references are
    /// compared through their `unknown-<dimension>` ids.
    pub fn matches(&self, lookups: &Lookups<'_>, record: &JoinRecord<'_>) -> bool {
        let checks = [
            (&self.company_ids, Dimension::Company),
            (&self.department_ids, Dimension::Department),
            (&self.user_ids, Dimension::Employee),
            (&self.process_ids, Dimension::Process),
            (&self.measure_ids, Dimension::Measure),
            (&self.categories, Dimension::Category),
        ];
        checks.iter().all(|(allowed, dim)| {
            allowed.is_empty() || allowed.contains(&dimension::resolve(lookups, record, *dim).id)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRequest {
    pub period: ReportPeriod,
    pub group_by: Vec<Dimension>,
    pub time_grain: TimeGrain,
    pub metric: Metric,
    pub filters: PivotFilters,
    pub statuses: Vec<PlanStatus>,
}

impl PivotRequest {
    pub fn new(period: ReportPeriod, group_by: Vec<Dimension>) -> Self {
        PivotRequest {
            period,
            group_by,
            time_grain: TimeGrain::default(),
            metric: Metric::default(),
            filters: PivotFilters::default(),
            statuses: PlanStatus::REPORTABLE.to_vec(),
        }
    }

    pub fn with_time_grain(mut self, time_grain: TimeGrain) -> Self {
        self.time_grain = time_grain;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_filters(mut self, filters: PivotFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<PlanStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Parses raw request parameters, failing on the first bad one.
    pub fn parse(
        year: i32,
        period_type: &str,
        period_value: Option<u32>,
        group_by: &str,
        time_grain: &str,
        metric: &str,
    ) -> ReportResult<Self> {
        let period_type: PeriodType = period_type.parse()?;
        let period = ReportPeriod::new(year, period_type, period_value)?;
        let group_by = Dimension::parse_list(group_by)?;
        Ok(PivotRequest::new(period, group_by)
            .with_time_grain(time_grain.parse()?)
            .with_metric(metric.parse()?))
    }

    pub fn validate(&self) -> ReportResult<()> {
        if self.group_by.is_empty() {
            return Err(ReportError::EmptyGroupBy);
        }
        self.period.validate()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PivotMeta {
    pub year: i32,
    pub period_type: PeriodType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_value: Option<u32>,
    pub group_by: Vec<Dimension>,
    pub time_grain: TimeGrain,
    pub metric: Metric,
    pub time_buckets: Vec<TimeBucket>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PivotRow {
    pub key: String,
    pub label: String,
    pub dimensions: Vec<DimensionValue>,
    pub buckets: BTreeMap<String, f64>,
    pub planned_buckets: BTreeMap<String, f64>,
    pub planned_total: f64,
    pub total: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PivotStats {
    pub total_hours: f64,
    pub planned_hours: f64,
    pub total_tasks: f64,
    /// Actual over planned hours for the whole dataset.
    pub kpi: f64,
    pub companies_count: usize,
    pub employees_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PivotResponse {
    pub meta: PivotMeta,
    pub rows: Vec<PivotRow>,
    pub column_totals: BTreeMap<String, f64>,
    pub grand_total: f64,
    pub stats: PivotStats,
}

impl PivotResponse {
    pub fn bucket_keys(&self) -> Vec<&str> {
        self.meta.time_buckets.iter().map(|b| b.key.as_str()).collect()
    }
}

/// Row accumulator used during the fold.
struct RowAccumulator {
    dimensions: Vec<DimensionValue>,
    buckets: BTreeMap<String, Tally>,
    total: Tally,
}

/// Validates the request, then folds the dataset into a pivot table.
pub fn aggregate(dataset: &Dataset, request: &PivotRequest) -> ReportResult<PivotResponse> {
    request.validate()?;

    let lookups = dataset.lookups();
    let facts = observation::collect_facts(dataset, &lookups, &request.statuses);
    Ok(fold(&lookups, &facts, request))
}

/// Folds already allocated facts. `request` is assumed valid.
pub fn fold(lookups: &Lookups<'_>, facts: &[Fact<'_>], request: &PivotRequest) -> PivotResponse {
    let time_buckets = bucket::buckets_for_period(&request.period, request.time_grain);

    let mut order: Vec<RowAccumulator> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grand = Tally::default();
    let mut companies: HashSet<String> = HashSet::new();
    let mut employees: HashSet<String> = HashSet::new();
    let mut skipped = 0usize;

    for fact in facts {
        let Some(time_bucket) = bucket::bucket_for(fact.date, request.time_grain, &request.period) else {
            skipped += 1;
            continue;
        };
        if !request.filters.is_empty() && !request.filters.matches(lookups, &fact.record) {
            skipped += 1;
            continue;
        }

        let dimensions = dimension::resolve_all(lookups, &fact.record, &request.group_by);
        let key = dimension::composite_key(&dimensions);
        let slot = match index.get(&key) {
            Some(slot) => *slot,
            None => {
                index.insert(key, order.len());
                order.push(RowAccumulator { dimensions, buckets: BTreeMap::new(), total: Tally::default() });
                order.len() - 1
            }
        };

        let row = &mut order[slot];
        row.buckets.entry(time_bucket.key.clone()).or_default().record(&fact.observation, fact.rate);
        row.total.record(&fact.observation, fact.rate);
        grand.record(&fact.observation, fact.rate);

        if let Some(company_id) = fact.record.company_id {
            companies.insert(company_id.to_string());
        }
        if let Some(user_id) = fact.record.user_id {
            employees.insert(user_id.to_string());
        }
    }

    let metric = request.metric;
    let rows: Vec<PivotRow> = order
        .into_iter()
        .map(|acc| {
            let mut buckets = BTreeMap::new();
            let mut planned_buckets = BTreeMap::new();
            for tb in &time_buckets {
                let tally = acc.buckets.get(&tb.key).copied().unwrap_or_default();
                buckets.insert(tb.key.clone(), metric.value(&tally));
                planned_buckets.insert(tb.key.clone(), tally.planned);
            }
            PivotRow {
                key: dimension::composite_key(&acc.dimensions),
                label: dimension::display_label(&acc.dimensions),
                dimensions: acc.dimensions,
                buckets,
                planned_buckets,
                planned_total: acc.total.planned,
                total: metric.value(&acc.total),
            }
        })
        .collect();

    let column_totals: BTreeMap<String, f64> = time_buckets
        .iter()
        .map(|tb| {
            let value: f64 = rows.iter().map(|row| row.buckets.get(&tb.key).copied().unwrap_or(0.0)).sum();
            (tb.key.clone(), value)
        })
        .collect();

    let grand_total: f64 = rows.iter().map(|row| row.total).sum();

    tracing::debug!(
        facts = facts.len(),
        skipped,
        rows = rows.len(),
        %metric,
        "pivot fold complete"
    );

    PivotResponse {
        meta: PivotMeta {
            year: request.period.year,
            period_type: request.period.period_type,
            period_value: request.period.period_value,
            group_by: request.group_by.clone(),
            time_grain: request.time_grain,
            metric,
            time_buckets,
        },
        rows,
        column_totals,
        grand_total,
        stats: PivotStats {
            total_hours: grand.hours,
            planned_hours: grand.planned,
            total_tasks: grand.tasks,
            kpi: Metric::Kpi.value(&grand),
            companies_count: companies.len(),
            employees_count: employees.len(),
        },
    }
}
