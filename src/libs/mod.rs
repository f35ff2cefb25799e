//! Reporting engine and its support modules.
//!
//! ## Features
//!
//! - **Data Model**: plans, task-hour aggregates and lookups (`plan`)
//! - **Engine**: dimension resolution, hour allocation, time buckets, metrics,
//!   pivot and drilldown folds, row ordering
//! - **Core Infrastructure**: configuration, data storage, messaging
//! - **User Interface**: console tables, number formatting, file export
//!
//! ## Usage
//!
//! ```rust,no_run
//! use planboard::libs::bucket::ReportPeriod;
//! use planboard::libs::dimension::Dimension;
//! use planboard::libs::pivot::{aggregate, PivotRequest};
//! use planboard::libs::plan::Dataset;
//!
//! let dataset = Dataset::from_json_file("snapshot.json".as_ref())?;
//! let request = PivotRequest::new(ReportPeriod::quarter(2026, 1), vec![Dimension::Company, Dimension::Process]);
//! let response = aggregate(&dataset, &request)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bucket;
pub mod config;
pub mod data_storage;
pub mod dimension;
pub mod distribution;
pub mod drilldown;
pub mod error;
pub mod export;
pub mod formatter;
pub mod messages;
pub mod metric;
pub mod observation;
pub mod pivot;
pub mod plan;
pub mod sort;
pub mod view;
