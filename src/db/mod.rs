//! SQLite store for collaborator snapshots.
//!
//! The engine only ever reads an in-memory [`Dataset`](crate::libs::plan::Dataset).
//! This layer keeps the last imported one on disk so reports can run without
//! pointing at a JSON file every time.
//!
//! ## Features
//!
//! - **Connection**: one database file in the platform data directory
//! - **Migrations**: versioned schema applied on every open
//! - **Snapshots**: wholesale replace on import, ordered load for reports
//!
//! ## Usage
//!
//! ```rust,no_run
//! use planboard::db::snapshots::Snapshots;
//! use planboard::libs::plan::Dataset;
//!
//! let mut store = Snapshots::new()?;
//! store.replace(&Dataset::default())?;
//! let dataset = store.load()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod migrations;
pub mod snapshots;
