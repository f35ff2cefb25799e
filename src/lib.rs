//! # Planboard - plan and hours reporting
//!
//! A command-line reporting engine for recurring operational work planned
//! per month and executed for several client companies.
//!
//! ## Features
//!
//! - **Pivot Reports**: any combination of company, department, employee,
//!   process, measure and category against month or quarter columns
//! - **Metrics**: hours, tasks, planned hours, cost and plan fulfilment (KPI)
//! - **Hour Allocation**: multi-company plans split evenly or by infrastructure
//! - **Drilldowns**: one month or quarter by a single dimension with plan
//!   status counts
//! - **Data Export**: CSV, JSON and Excel
//!
//! ## Usage
//!
//! ```rust,no_run
//! use planboard::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
