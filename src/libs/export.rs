//! Export of report results for spreadsheets and other tools.
//!
//! ## Features
//!
//! - **Formats**: CSV, pretty JSON, and Excel with a bold header row
//! - **Reports**: pivot tables (one column per time bucket) and drilldowns
//! - **Totals**: tabular formats end with an "Итого" row; JSON keeps the full
//!   response including column totals and statistics
//! - **File Naming**: `planboard_<report>_<timestamp>.<ext>` unless a path is given
//!
//! Numbers are rounded to the configured number of decimals in CSV and Excel
//! only; JSON carries the unrounded engine values.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use planboard::libs::export::{ExportFormat, Exporter};
//! use planboard::libs::pivot::{aggregate, PivotRequest};
//! use planboard::libs::bucket::ReportPeriod;
//! use planboard::libs::dimension::Dimension;
//! use planboard::libs::plan::Dataset;
//!
//! let dataset = Dataset::default();
//! let response = aggregate(&dataset, &PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company]))?;
//! Exporter::new(ExportFormat::Csv, None, "pivot").export_pivot(&response)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::{
    libs::{
        drilldown::DrilldownReport,
        formatter::round_to,
        messages::Message,
        pivot::PivotResponse,
        view::{View, TOTAL_LABEL},
    },
    msg_success,
};
use anyhow::Result;
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }
}

/// A report flattened into header + string/number cells.
struct Sheet {
    header: Vec<String>,
    rows: Vec<Vec<SheetCell>>,
}

enum SheetCell {
    Text(String),
    Number(f64),
}

pub struct Exporter {
    format: ExportFormat,
    output_path: PathBuf,
    decimals: usize,
}

impl Exporter {
    /// `report` names the default file, e.g. `pivot` or `drilldown`.
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>, report: &str) -> Self {
        let default_name = format!("planboard_{}_{}", report, Local::now().format("%Y%m%d_%H%M%S"));
        let output_path =
            output_path.unwrap_or_else(|| PathBuf::from(format!("{}.{}", default_name, format.extension())));

        Self { format, output_path, decimals: 2 }
    }

    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn export_pivot(&self, response: &PivotResponse) -> Result<()> {
        match self.format {
            ExportFormat::Json => self.write_json(response)?,
            _ => self.write_sheet(&Self::pivot_sheet(response), "Pivot")?,
        }
        msg_success!(Message::ExportCompleted(self.output_path.display().to_string()));
        Ok(())
    }

    pub fn export_drilldown(&self, report: &DrilldownReport) -> Result<()> {
        match self.format {
            ExportFormat::Json => self.write_json(report)?,
            _ => self.write_sheet(&Self::drilldown_sheet(report), "Drilldown")?,
        }
        msg_success!(Message::ExportCompleted(self.output_path.display().to_string()));
        Ok(())
    }

    fn pivot_sheet(response: &PivotResponse) -> Sheet {
        let mut header = vec![View::group_title(response)];
        header.extend(response.meta.time_buckets.iter().map(|b| b.label.clone()));
        header.push(TOTAL_LABEL.to_string());

        let keys = response.bucket_keys();
        let mut rows: Vec<Vec<SheetCell>> = response
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![SheetCell::Text(row.label.clone())];
                cells.extend(keys.iter().map(|key| SheetCell::Number(row.buckets.get(*key).copied().unwrap_or(0.0))));
                cells.push(SheetCell::Number(row.total));
                cells
            })
            .collect();

        let mut totals = vec![SheetCell::Text(TOTAL_LABEL.to_string())];
        totals.extend(
            keys.iter()
                .map(|key| SheetCell::Number(response.column_totals.get(*key).copied().unwrap_or(0.0))),
        );
        totals.push(SheetCell::Number(response.grand_total));
        rows.push(totals);

        Sheet { header, rows }
    }

    fn drilldown_sheet(report: &DrilldownReport) -> Sheet {
        let view = report.by;
        let header = ["#", view.title(), view.scope_title(), "Задачи", "Часы", "Активные", "Выполненные"]
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows: Vec<Vec<SheetCell>> = report
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                vec![
                    SheetCell::Number((i + 1) as f64),
                    SheetCell::Text(view.main_value(row).to_string()),
                    SheetCell::Text(view.scope_value(row).to_string()),
                    SheetCell::Number(row.tasks_count),
                    SheetCell::Number(row.total_hours),
                    SheetCell::Number(row.active_count as f64),
                    SheetCell::Number(row.completed_count as f64),
                ]
            })
            .collect();

        let totals = report.totals();
        rows.push(vec![
            SheetCell::Text(String::new()),
            SheetCell::Text(TOTAL_LABEL.to_string()),
            SheetCell::Text(String::new()),
            SheetCell::Number(totals.tasks_count),
            SheetCell::Number(totals.total_hours),
            SheetCell::Number(totals.active_count as f64),
            SheetCell::Number(totals.completed_count as f64),
        ]);

        Sheet { header, rows }
    }

    fn write_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        File::create(&self.output_path)?.write_all(json.as_bytes())?;
        Ok(())
    }

    fn write_sheet(&self, sheet: &Sheet, name: &str) -> Result<()> {
        match self.format {
            ExportFormat::Excel => self.write_excel(sheet, name),
            _ => self.write_csv(sheet),
        }
    }

    fn write_csv(&self, sheet: &Sheet) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.output_path)?;
        wtr.write_record(&sheet.header)?;
        for row in &sheet.rows {
            let record: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    SheetCell::Text(text) => text.clone(),
                    SheetCell::Number(value) => round_to(*value, self.decimals).to_string(),
                })
                .collect();
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_excel(&self, sheet: &Sheet, name: &str) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;

        let header_format = Format::new().set_bold().set_background_color(rust_xlsxwriter::Color::Gray);

        for (col, title) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, title, &header_format)?;
        }

        for (i, row) in sheet.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    SheetCell::Text(text) => worksheet.write_string(r, col as u16, text)?,
                    SheetCell::Number(value) => worksheet.write_number(r, col as u16, round_to(*value, self.decimals))?,
                };
            }
        }

        workbook.save(&self.output_path)?;
        Ok(())
    }
}
