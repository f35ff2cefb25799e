/// Every user-facing message of the application.
///
/// Text lives in the `Display` impl in `display.rs`; call sites only pick a
/// variant and pass its parameters.
#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDatasetSet(String), // path
    ConfigLoadFailed(String), // error

    // === DATASET MESSAGES ===
    DatasetLoaded {
        source: String,
        plans: usize,
        task_hours: usize,
    },
    DatasetLoadFailed(String, String), // source, error
    DatasetImported {
        plans: usize,
        task_hours: usize,
        companies: usize,
    },
    DatasetEmpty,
    StoreEmpty,

    // === REPORT MESSAGES ===
    InvalidRequest(String),
    PivotHeader {
        group_by: String,
        metric: String,
        period: String,
    },
    PivotStats {
        total_hours: String,
        planned_hours: String,
        total_tasks: String,
        kpi: String,
        companies: usize,
        employees: usize,
    },
    NoPivotRows(String), // period
    UnknownSortBucket(String),
    DrilldownHeader {
        view: String,
        period: String,
    },
    NoDrilldownRows(String), // period

    // === ALLOCATION MESSAGES ===
    PlanNotFound(String),
    PlanNotMonthly(String),
    SharesHeader {
        plan_id: String,
        distribution: String,
        total_hours: String,
    },
    PlanWithoutCompanies(String),

    // === PERIOD MESSAGES ===
    PeriodsHeader,
    NoPeriods,

    // === EXPORT MESSAGES ===
    ExportCompleted(String),
    ExportFailed(String),
}
