use super::distribution::CompanyHourShare;
use super::drilldown::{DrilldownReport, MonthPeriod};
use super::formatter::{format_number, format_value};
use super::metric::Metric;
use super::pivot::PivotResponse;
use super::bucket::month_name;
use anyhow::Result;
use prettytable::{row, Cell, Row, Table};

pub const TOTAL_LABEL: &str = "Итого";

pub struct View {}

impl View {
    pub fn pivot(response: &PivotResponse, decimals: usize) -> Result<()> {
        let metric = response.meta.metric;
        let mut table = Table::new();

        let mut header = vec![Cell::new("#"), Cell::new(&Self::group_title(response))];
        header.extend(response.meta.time_buckets.iter().map(|b| Cell::new(&b.label)));
        header.push(Cell::new(TOTAL_LABEL));
        table.set_titles(Row::new(header));

        for (i, row) in response.rows.iter().enumerate() {
            let mut cells = vec![Cell::new(&(i + 1).to_string()), Cell::new(&row.label)];
            for bucket in &response.meta.time_buckets {
                let value = row.buckets.get(&bucket.key).copied().unwrap_or(0.0);
                cells.push(Cell::new(&format_value(metric, value, decimals)));
            }
            cells.push(Cell::new(&format_value(metric, row.total, decimals)));
            table.add_row(Row::new(cells));
        }

        let mut totals = vec![Cell::new(""), Cell::new(TOTAL_LABEL)];
        for bucket in &response.meta.time_buckets {
            let value = response.column_totals.get(&bucket.key).copied().unwrap_or(0.0);
            totals.push(Cell::new(&format_value(metric, value, decimals)));
        }
        totals.push(Cell::new(&format_value(metric, response.grand_total, decimals)));
        table.add_row(Row::new(totals));

        table.printstd();
        Ok(())
    }

    /// Header of the label column, e.g. `Предприятие / Процесс`.
    pub fn group_title(response: &PivotResponse) -> String {
        response.meta.group_by.iter().map(|d| d.title()).collect::<Vec<_>>().join(" / ")
    }

    pub fn drilldown(report: &DrilldownReport, decimals: usize) -> Result<()> {
        let view = report.by;
        let mut table = Table::new();
        table.set_titles(row!["#", view.title(), view.scope_title(), "Задачи", "Часы", "Статус"]);

        for (i, row) in report.rows.iter().enumerate() {
            table.add_row(row![
                i + 1,
                view.main_value(row),
                view.scope_value(row),
                format_value(Metric::Tasks, row.tasks_count, decimals),
                format_number(row.total_hours, decimals),
                row.status_text()
            ]);
        }

        let totals = report.totals();
        table.add_row(row![
            "",
            TOTAL_LABEL,
            "",
            format_value(Metric::Tasks, totals.tasks_count, decimals),
            format_number(totals.total_hours, decimals),
            totals.status_text()
        ]);

        table.printstd();
        Ok(())
    }

    pub fn shares(shares: &[CompanyHourShare], names: &dyn Fn(&str) -> String) -> Result<()> {
        let mut table = Table::new();
        table.set_titles(row!["ID", "Предприятие", "Доля", "Часы"]);
        for share in shares {
            table.add_row(row![
                share.company_id,
                names(&share.company_id),
                format!("{}%", format_number(share.share * 100.0, 2)),
                format_number(share.hours, 2)
            ]);
        }
        table.printstd();
        Ok(())
    }

    pub fn periods(periods: &[MonthPeriod], decimals: usize) -> Result<()> {
        let mut table = Table::new();
        table.set_titles(row!["Период", "Квартал", "Задачи", "Часы"]);
        for period in periods {
            table.add_row(row![
                format!("{} {}", month_name(period.month), period.year),
                format!("Q{}", period.quarter),
                format_value(Metric::Tasks, period.tasks_count, decimals),
                format_number(period.total_hours, decimals)
            ]);
        }
        table.printstd();
        Ok(())
    }
}
