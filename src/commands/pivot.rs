use super::DataArgs;
use crate::{
    libs::{
        bucket::{PeriodType, ReportPeriod, TimeGrain},
        config::Config,
        dimension::Dimension,
        formatter::format_number,
        messages::Message,
        metric::Metric,
        pivot::{self, PivotFilters, PivotRequest, PivotResponse},
        sort::{SortDirection, SortField, SortState},
        view::View,
    },
    msg_error_anyhow, msg_info, msg_print, msg_warning,
};
use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Args;

/// Request options shared by `pivot` and `export pivot`.
#[derive(Debug, Args, Clone)]
pub struct PivotQuery {
    #[command(flatten)]
    pub source: DataArgs,

    /// Report year, current year by default
    #[arg(short, long)]
    pub year: Option<i32>,

    #[arg(long, value_enum, default_value = "year")]
    pub period_type: PeriodType,

    /// Month (1-12) or quarter (1-4) when the period type needs one
    #[arg(long)]
    pub period_value: Option<u32>,

    /// Comma separated dimensions, e.g. `company,process`
    #[arg(short, long)]
    pub group_by: Option<String>,

    #[arg(short, long, value_enum)]
    pub time_grain: Option<TimeGrain>,

    #[arg(short, long, value_enum)]
    pub metric: Option<Metric>,

    #[arg(long = "company")]
    pub companies: Vec<String>,

    #[arg(long = "department")]
    pub departments: Vec<String>,

    #[arg(long = "employee")]
    pub employees: Vec<String>,

    #[arg(long = "process")]
    pub processes: Vec<String>,

    #[arg(long = "measure")]
    pub measures: Vec<String>,

    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// `name`, `total` or a bucket key such as `2026-03`
    #[arg(short, long, default_value = "total")]
    pub sort: String,

    /// Overrides the field's default direction
    #[arg(long, value_enum)]
    pub direction: Option<SortDirection>,
}

impl PivotQuery {
    /// Builds and validates the request, filling gaps from the configuration.
    pub fn request(&self, config: &Config) -> Result<PivotRequest> {
        let defaults = config.report();
        let year = self.year.unwrap_or_else(|| Local::now().year());
        let group_by = match self.group_by.as_deref() {
            Some(raw) => Dimension::parse_list(raw),
            None => Ok(defaults.default_group_by.clone()),
        };

        let request = group_by
            .and_then(|group_by| {
                let period = ReportPeriod::new(year, self.period_type, self.period_value)?;
                Ok(PivotRequest::new(period, group_by))
            })
            .map_err(|e| msg_error_anyhow!(Message::InvalidRequest(e.to_string())))?
            .with_time_grain(self.time_grain.unwrap_or(defaults.default_time_grain))
            .with_metric(self.metric.unwrap_or(defaults.default_metric))
            .with_statuses(defaults.reportable_statuses)
            .with_filters(PivotFilters {
                company_ids: self.companies.clone(),
                department_ids: self.departments.clone(),
                user_ids: self.employees.clone(),
                process_ids: self.processes.clone(),
                measure_ids: self.measures.clone(),
                categories: self.categories.clone(),
            });

        request
            .validate()
            .map_err(|e| msg_error_anyhow!(Message::InvalidRequest(e.to_string())))?;
        Ok(request)
    }

    pub fn sort_state(&self) -> SortState {
        let field = SortField::parse(&self.sort);
        let direction = self.direction.unwrap_or_else(|| field.default_direction());
        SortState { field, direction }
    }

    /// Loads data, aggregates and orders the rows.
    pub fn run(&self, config: &Config) -> Result<PivotResponse> {
        let request = self.request(config)?;
        let dataset = self.source.load(config)?;
        let mut response = pivot::aggregate(&dataset, &request)?;

        let mut state = self.sort_state();
        if let SortField::Bucket(key) = &state.field {
            if !response.meta.time_buckets.iter().any(|b| &b.key == key) {
                msg_warning!(Message::UnknownSortBucket(key.clone()));
                state = SortState { field: SortField::Total, direction: state.direction };
            }
        }
        state.apply(&mut response.rows);
        Ok(response)
    }
}

#[derive(Debug, Args)]
pub struct PivotArgs {
    #[command(flatten)]
    query: PivotQuery,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

pub fn cmd(args: PivotArgs) -> Result<()> {
    let config = Config::read()?;
    let response = args.query.run(&config)?;

    if args.json {
        msg_print!(serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let period = ReportPeriod {
        year: response.meta.year,
        period_type: response.meta.period_type,
        period_value: response.meta.period_value,
    }
    .label();

    if response.rows.is_empty() {
        msg_info!(Message::NoPivotRows(period));
        return Ok(());
    }

    let decimals = config.report().decimals;
    msg_print!(
        Message::PivotHeader {
            group_by: View::group_title(&response),
            metric: format!("{} ({})", response.meta.metric, response.meta.metric.unit()),
            period,
        },
        true
    );
    View::pivot(&response, decimals)?;
    msg_print!(Message::PivotStats {
        total_hours: format_number(response.stats.total_hours, decimals),
        planned_hours: format_number(response.stats.planned_hours, decimals),
        total_tasks: format_number(response.stats.total_tasks, decimals),
        kpi: format!("{}%", format_number(response.stats.kpi, decimals)),
        companies: response.stats.companies_count,
        employees: response.stats.employees_count,
    });
    Ok(())
}
