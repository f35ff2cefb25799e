//! Schema versioning for the local snapshot store.
//!
//! Migrations are registered in order and applied inside one transaction;
//! the `migrations` table records which versions have run.
//!
//! ```rust,no_run
//! use planboard::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open_in_memory()?;
//! init_with_migrations(&mut conn)?;
//! assert_eq!(get_db_version(&conn)?, 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::msg_debug;
use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        self.add_migration(1, "create_snapshot_tables", |tx| {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS plans (
                    id TEXT NOT NULL PRIMARY KEY,
                    level TEXT NOT NULL,
                    year INTEGER NOT NULL,
                    month INTEGER,
                    quarter INTEGER,
                    status TEXT NOT NULL,
                    distribution_type TEXT,
                    parent_id TEXT,
                    measure_id TEXT,
                    department_id TEXT,
                    planned_hours REAL
                );
                CREATE TABLE IF NOT EXISTS task_hours (
                    id INTEGER PRIMARY KEY,
                    plan_id TEXT NOT NULL,
                    user_id TEXT,
                    total_spent_hours REAL NOT NULL DEFAULT 0,
                    tasks_count INTEGER NOT NULL DEFAULT 0
                );
                CREATE TABLE IF NOT EXISTS plan_companies (
                    id INTEGER PRIMARY KEY,
                    plan_id TEXT NOT NULL,
                    company_id TEXT NOT NULL,
                    company_name TEXT
                );
                CREATE TABLE IF NOT EXISTS infrastructure (
                    id INTEGER PRIMARY KEY,
                    company_id TEXT NOT NULL,
                    period_year INTEGER NOT NULL,
                    period_month INTEGER NOT NULL,
                    servers_count INTEGER NOT NULL DEFAULT 0,
                    workstations_count INTEGER NOT NULL DEFAULT 0
                );
                CREATE TABLE IF NOT EXISTS users (
                    user_id TEXT NOT NULL PRIMARY KEY,
                    full_name TEXT,
                    department_id TEXT
                );
                CREATE TABLE IF NOT EXISTS departments (
                    department_id TEXT NOT NULL PRIMARY KEY,
                    name TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS measures (
                    measure_id TEXT NOT NULL PRIMARY KEY,
                    name TEXT NOT NULL,
                    service_name TEXT,
                    process_id TEXT,
                    category TEXT
                );
                CREATE TABLE IF NOT EXISTS processes (
                    process_id TEXT NOT NULL PRIMARY KEY,
                    name TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS companies (
                    company_id TEXT NOT NULL PRIMARY KEY,
                    name TEXT NOT NULL,
                    rate_per_hour REAL
                );
                CREATE INDEX IF NOT EXISTS idx_plans_period ON plans(year, month);
                CREATE INDEX IF NOT EXISTS idx_task_hours_plan ON task_hours(plan_id);
                CREATE INDEX IF NOT EXISTS idx_plan_companies_plan ON plan_companies(plan_id);
                CREATE INDEX IF NOT EXISTS idx_infrastructure_period ON infrastructure(period_year, period_month);",
            )?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();
        if pending.is_empty() {
            msg_debug!("Database is up to date");
            return Ok(());
        }

        let tx = conn.transaction()?;
        for migration in pending {
            tracing::info!(version = migration.version, name = migration.name, "applying migration");
            if let Err(e) = (migration.up)(&tx) {
                tracing::error!(version = migration.version, error = %e, "migration failed");
                return Err(e);
            }
            tx.execute(
                "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                params![migration.version, migration.name],
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn
            .query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))
            .unwrap_or(Some(0));
        Ok(version.unwrap_or(0))
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    Ok(manager.get_current_version(conn)? < manager.latest_version())
}
