//! # Drilldown Aggregator
//!
//! Single-dimension breakdowns of one month or quarter that also count plans
//! by status.
//!
//! ## Views
//!
//! - **process**: one row per `(department, process)`, unsplit plan totals
//! - **procedure**: one row per `(department, measure)`
//! - **company**: allocated hours per `(company, process)`, then rolled up into
//!   one "Сводно" row per company
//! - **employee**: one row per user, scoped by the user's department
//! - **department**: employee rows rolled up by department
//!
//! The company and department summaries are built in two explicit passes.
//! Hours are split per plan and company first; only the finished first pass is
//! re-grouped, so a multi-company plan is never counted twice.
//!
//! `active_count`/`completed_count` are independent counters: a row spanning
//! several plans counts each one in its own status.

use super::bucket::{ReportPeriod, quarter_of};
use super::dimension::{self, Dimension};
use super::error::{ReportError, ReportResult};
use super::observation::{self, is_reportable};
use super::plan::{Dataset, Lookups, Plan, PlanStatus};
use super::sort;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub const SUMMARY_NAME: &str = "Сводно";
pub const SUMMARY_ID: &str = "company-summary";
const UNKNOWN_PROCEDURE_NAME: &str = "Без процедуры";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DrilldownView {
    Process,
    Procedure,
    Company,
    Employee,
    Department,
}

impl DrilldownView {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrilldownView::Process => "process",
            DrilldownView::Procedure => "procedure",
            DrilldownView::Company => "company",
            DrilldownView::Employee => "employee",
            DrilldownView::Department => "department",
        }
    }

    /// Second-order views built by re-aggregating a first pass.
    pub fn is_summary(&self) -> bool {
        matches!(self, DrilldownView::Company | DrilldownView::Department)
    }

    /// Header of the name column.
    pub fn title(&self) -> &'static str {
        match self {
            DrilldownView::Process => "Процесс",
            DrilldownView::Procedure => "Процедура",
            DrilldownView::Company => "Предприятие",
            DrilldownView::Employee => "Сотрудник",
            DrilldownView::Department => "Отдел",
        }
    }

    /// Header of the scope column.
    pub fn scope_title(&self) -> &'static str {
        match self {
            DrilldownView::Company => "Сводка",
            _ => "Отдел",
        }
    }

    /// Text of the main column: summary rows are shown by their scope.
    pub fn main_value<'r>(&self, row: &'r DrilldownRow) -> &'r str {
        if self.is_summary() {
            &row.scope_name
        } else {
            &row.name
        }
    }

    /// Text of the scope column.
    pub fn scope_value<'r>(&self, row: &'r DrilldownRow) -> &'r str {
        match self {
            DrilldownView::Company => &row.name,
            _ => &row.scope_name,
        }
    }
}

impl FromStr for DrilldownView {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        match s.trim() {
            "process" => Ok(DrilldownView::Process),
            "procedure" | "measure" => Ok(DrilldownView::Procedure),
            "company" => Ok(DrilldownView::Company),
            "employee" => Ok(DrilldownView::Employee),
            "department" => Ok(DrilldownView::Department),
            other => Err(ReportError::UnknownDrilldownDimension(other.to_string())),
        }
    }
}

impl fmt::Display for DrilldownView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum DrilldownPeriod {
    Month(u32),
    Quarter(u32),
}

impl DrilldownPeriod {
    /// Builds the period from CLI-style options; exactly one must be set.
    pub fn from_parts(month: Option<u32>, quarter: Option<u32>) -> ReportResult<Self> {
        match (month, quarter) {
            (Some(month), None) => Ok(DrilldownPeriod::Month(month)),
            (None, Some(quarter)) => Ok(DrilldownPeriod::Quarter(quarter)),
            _ => Err(ReportError::UnsupportedDrilldownPeriod),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DrilldownRequest {
    pub year: i32,
    pub period: DrilldownPeriod,
    pub by: DrilldownView,
    #[serde(default = "default_statuses")]
    pub statuses: Vec<PlanStatus>,
}

fn default_statuses() -> Vec<PlanStatus> {
    PlanStatus::REPORTABLE.to_vec()
}

impl DrilldownRequest {
    pub fn new(year: i32, period: DrilldownPeriod, by: DrilldownView) -> Self {
        DrilldownRequest { year, period, by, statuses: default_statuses() }
    }

    pub fn with_statuses(mut self, statuses: Vec<PlanStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn report_period(&self) -> ReportResult<ReportPeriod> {
        let period = match self.period {
            DrilldownPeriod::Month(month) => ReportPeriod::month(self.year, month),
            DrilldownPeriod::Quarter(quarter) => ReportPeriod::quarter(self.year, quarter),
        };
        period.validate()?;
        Ok(period)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DrilldownRow {
    pub key: String,
    pub id: String,
    pub name: String,
    pub scope_id: String,
    pub scope_name: String,
    pub active_count: u32,
    pub completed_count: u32,
    pub tasks_count: f64,
    pub total_hours: f64,
}

impl DrilldownRow {
    fn new(key: String, id: &str, name: &str, scope_id: &str, scope_name: &str) -> Self {
        DrilldownRow {
            key,
            id: id.to_string(),
            name: name.to_string(),
            scope_id: scope_id.to_string(),
            scope_name: scope_name.to_string(),
            ..Default::default()
        }
    }

    fn count_status(&mut self, status: PlanStatus) {
        match status {
            PlanStatus::Active => self.active_count += 1,
            PlanStatus::Completed => self.completed_count += 1,
            _ => {}
        }
    }

    fn absorb(&mut self, other: &DrilldownRow) {
        self.active_count += other.active_count;
        self.completed_count += other.completed_count;
        self.tasks_count += other.tasks_count;
        self.total_hours += other.total_hours;
    }

    /// `active/completed`, or whichever one is non-zero.
    pub fn status_text(&self) -> String {
        match (self.active_count, self.completed_count) {
            (0, 0) => "—".to_string(),
            (active, 0) => active.to_string(),
            (0, completed) => completed.to_string(),
            (active, completed) => format!("{}/{}", active, completed),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrilldownReport {
    pub year: i32,
    pub period: DrilldownPeriod,
    pub period_label: String,
    pub by: DrilldownView,
    pub rows: Vec<DrilldownRow>,
}

impl DrilldownReport {
    /// Sum of every row, used for the "Итого" line.
    pub fn totals(&self) -> DrilldownRow {
        let mut total = DrilldownRow::new("total".into(), "total", "Итого", "", "");
        for row in &self.rows {
            total.absorb(row);
        }
        total
    }
}

/// Insertion-ordered upsert map for rows.
#[derive(Default)]
struct RowFold {
    rows: Vec<DrilldownRow>,
    index: HashMap<String, usize>,
}

impl RowFold {
    fn entry(&mut self, key: String, make: impl FnOnce(String) -> DrilldownRow) -> &mut DrilldownRow {
        let slot = match self.index.get(&key) {
            Some(slot) => *slot,
            None => {
                self.index.insert(key.clone(), self.rows.len());
                self.rows.push(make(key));
                self.rows.len() - 1
            }
        };
        &mut self.rows[slot]
    }

    fn into_rows(self) -> Vec<DrilldownRow> {
        self.rows
    }
}

/// Runs a drilldown over the plans of the requested period.
pub fn aggregate(dataset: &Dataset, request: &DrilldownRequest) -> ReportResult<DrilldownReport> {
    let period = request.report_period()?;
    let lookups = dataset.lookups();
    let plans: Vec<&Plan> = dataset
        .plans
        .iter()
        .filter(|plan| is_reportable(plan, &request.statuses))
        .filter(|plan| plan.period_date().is_some_and(|date| period.contains(date)))
        .collect();

    let mut rows = match request.by {
        DrilldownView::Process => by_process(&lookups, &plans),
        DrilldownView::Procedure => by_procedure(&lookups, &plans),
        DrilldownView::Company => summarize_companies(by_company_process(dataset, &lookups, request, &period)),
        DrilldownView::Employee => by_employee(&lookups, &plans),
        DrilldownView::Department => summarize_departments(by_employee(&lookups, &plans)),
    };
    sort::sort_drilldown(&mut rows, request.by);

    tracing::debug!(by = %request.by, plans = plans.len(), rows = rows.len(), "drilldown complete");

    Ok(DrilldownReport {
        year: request.year,
        period: request.period,
        period_label: period.label(),
        by: request.by,
        rows,
    })
}

/// Department of a plan with its display name, or the unknown sentinel.
fn plan_department<'a>(lookups: &Lookups<'a>, plan: &'a Plan) -> (String, String) {
    let dim = Dimension::Department;
    match plan.department_id.as_deref() {
        Some(id) => {
            let name = lookups.departments.get(id).map(|d| d.name.as_str()).unwrap_or(dim.unknown_label());
            (id.to_string(), name.to_string())
        }
        None => (dim.unknown_id(), dim.unknown_label().to_string()),
    }
}

fn plan_process<'a>(lookups: &Lookups<'a>, plan: &'a Plan) -> (String, String) {
    let dim = Dimension::Process;
    match lookups.measure_of(plan).and_then(|m| m.process_id.as_deref()) {
        Some(id) => {
            let name = lookups.processes.get(id).map(|p| p.name.as_str()).unwrap_or(dim.unknown_label());
            (id.to_string(), name.to_string())
        }
        None => (dim.unknown_id(), dim.unknown_label().to_string()),
    }
}

pub fn by_process(lookups: &Lookups<'_>, plans: &[&Plan]) -> Vec<DrilldownRow> {
    let mut fold = RowFold::default();
    for plan in plans {
        let (dept_id, dept_name) = plan_department(lookups, plan);
        let (process_id, process_name) = plan_process(lookups, plan);
        let (hours, tasks) = lookups.plan_totals(&plan.id);
        let key = dimension::join_key(&[dept_id.as_str(), process_id.as_str()]);
        let row = fold.entry(key, |key| DrilldownRow::new(key, &process_id, &process_name, &dept_id, &dept_name));
        row.count_status(plan.status);
        row.total_hours += hours;
        row.tasks_count += tasks;
    }
    fold.into_rows()
}

pub fn by_procedure(lookups: &Lookups<'_>, plans: &[&Plan]) -> Vec<DrilldownRow> {
    let mut fold = RowFold::default();
    for plan in plans {
        let (dept_id, dept_name) = plan_department(lookups, plan);
        let measure = lookups.measure_of(plan);
        let procedure_id = match measure {
            Some(m) => m.measure_id.clone(),
            None => format!("unknown-procedure-{}", plan.id),
        };
        let procedure_name = measure
            .and_then(|m| m.service_name.as_deref().filter(|s| !s.is_empty()).or(Some(m.name.as_str())))
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_PROCEDURE_NAME);
        let (hours, tasks) = lookups.plan_totals(&plan.id);
        let key = dimension::join_key(&[dept_id.as_str(), procedure_id.as_str()]);
        let row = fold.entry(key, |key| DrilldownRow::new(key, &procedure_id, procedure_name, &dept_id, &dept_name));
        row.count_status(plan.status);
        row.total_hours += hours;
        row.tasks_count += tasks;
    }
    fold.into_rows()
}

/// First pass of the company view: allocated hours per `(company, process)`.
///
/// `id`/`name` hold the process, `scope_*` the company. Each plan counts once
/// per company it is split to.
pub fn by_company_process(
    dataset: &Dataset,
    lookups: &Lookups<'_>,
    request: &DrilldownRequest,
    period: &ReportPeriod,
) -> Vec<DrilldownRow> {
    let facts = observation::collect_facts(dataset, lookups, &request.statuses);
    let company = Dimension::Company;
    let mut fold = RowFold::default();
    let mut counted: HashSet<(String, &str)> = HashSet::new();

    for fact in facts.iter().filter(|fact| period.contains(fact.date)) {
        let (company_id, company_name) = match fact.record.company_id {
            Some(id) => {
                let name = lookups
                    .companies
                    .get(id)
                    .map(|c| c.name.as_str())
                    .or(fact.record.company_name)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(company.unknown_label());
                (id.to_string(), name.to_string())
            }
            None => (company.unknown_id(), company.unknown_label().to_string()),
        };
        let (process_id, process_name) = plan_process(lookups, fact.plan);
        let key = dimension::join_key(&[company_id.as_str(), process_id.as_str()]);

        let first_time = counted.insert((key.clone(), fact.plan.id.as_str()));
        let row = fold.entry(key, |key| DrilldownRow::new(key, &process_id, &process_name, &company_id, &company_name));
        if first_time {
            row.count_status(fact.plan.status);
        }
        row.total_hours += fact.observation.hours_actual;
        row.tasks_count += fact.observation.task_count;
    }
    fold.into_rows()
}

/// Second pass of the company view: one "Сводно" row per company.
pub fn summarize_companies(rows: Vec<DrilldownRow>) -> Vec<DrilldownRow> {
    let mut fold = RowFold::default();
    for row in &rows {
        fold.entry(row.scope_id.clone(), |key| DrilldownRow::new(key, SUMMARY_ID, SUMMARY_NAME, &row.scope_id, &row.scope_name))
            .absorb(row);
    }
    fold.into_rows()
}

/// First pass of the department view: one row per user, counting every
/// `(plan, user)` record in its plan's status.
pub fn by_employee(lookups: &Lookups<'_>, plans: &[&Plan]) -> Vec<DrilldownRow> {
    let employee = Dimension::Employee;
    let department = Dimension::Department;
    let mut fold = RowFold::default();

    for plan in plans {
        let Some(records) = lookups.task_hours.get(plan.id.as_str()) else {
            continue;
        };
        for record in records {
            let user_id = record.user_id.clone().unwrap_or_else(|| employee.unknown_id());
            let user = lookups.user(record.user_id.as_deref());
            let name = user
                .and_then(|u| u.full_name.as_deref())
                .filter(|n| !n.is_empty())
                .unwrap_or(employee.unknown_label());
            let dept_id = user
                .and_then(|u| u.department_id.clone())
                .unwrap_or_else(|| department.unknown_id());
            let dept_name = lookups
                .departments
                .get(dept_id.as_str())
                .map(|d| d.name.as_str())
                .unwrap_or(department.unknown_label());

            let row = fold.entry(user_id.clone(), |key| DrilldownRow::new(key, &user_id, name, &dept_id, dept_name));
            row.count_status(plan.status);
            row.tasks_count += record.tasks_count as f64;
            row.total_hours += super::plan::safe_number(record.total_spent_hours);
        }
    }
    fold.into_rows()
}

/// Second pass of the department view.
pub fn summarize_departments(rows: Vec<DrilldownRow>) -> Vec<DrilldownRow> {
    let mut fold = RowFold::default();
    for row in &rows {
        fold.entry(row.scope_id.clone(), |key| {
            DrilldownRow::new(key, &row.scope_id, &row.scope_name, &row.scope_id, &row.scope_name)
        })
        .absorb(row);
    }
    fold.into_rows()
}

/// One month that has reportable work.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthPeriod {
    pub key: String,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
    pub tasks_count: f64,
    pub total_hours: f64,
}

/// Months that contain reportable plans with at least one task, newest first.
pub fn period_overview(dataset: &Dataset, statuses: &[PlanStatus]) -> Vec<MonthPeriod> {
    let lookups = dataset.lookups();
    let mut fold: Vec<MonthPeriod> = Vec::new();
    let mut index: HashMap<(i32, u32), usize> = HashMap::new();

    for plan in dataset.plans.iter().filter(|plan| is_reportable(plan, statuses)) {
        let Some(month) = plan.month else {
            continue;
        };
        let (hours, tasks) = lookups.plan_totals(&plan.id);
        if tasks <= 0.0 {
            continue;
        }
        let slot = *index.entry((plan.year, month)).or_insert_with(|| {
            fold.push(MonthPeriod {
                key: format!("{}-{:02}", plan.year, month),
                year: plan.year,
                month,
                quarter: quarter_of(month),
                tasks_count: 0.0,
                total_hours: 0.0,
            });
            fold.len() - 1
        });
        fold[slot].tasks_count += tasks;
        fold[slot].total_hours += hours;
    }

    fold.sort_by(|a, b| b.year.cmp(&a.year).then(b.month.cmp(&a.month)));
    fold
}
