use super::db::Db;
use crate::libs::distribution::DistributionType;
use crate::libs::plan::{
    Company, Dataset, Department, InfrastructureSnapshot, Measure, Plan, PlanCompany, Process, TaskHours, User,
};
use anyhow::Result;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;

const TABLES: [&str; 9] = [
    "plans",
    "task_hours",
    "plan_companies",
    "infrastructure",
    "users",
    "departments",
    "measures",
    "processes",
    "companies",
];

const INSERT_PLAN: &str = "INSERT INTO plans (id, level, year, month, quarter, status, distribution_type, parent_id, measure_id, department_id, planned_hours) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
const INSERT_TASK_HOURS: &str =
    "INSERT INTO task_hours (plan_id, user_id, total_spent_hours, tasks_count) VALUES (?1, ?2, ?3, ?4)";
const INSERT_PLAN_COMPANY: &str = "INSERT INTO plan_companies (plan_id, company_id, company_name) VALUES (?1, ?2, ?3)";
const INSERT_INFRASTRUCTURE: &str = "INSERT INTO infrastructure (company_id, period_year, period_month, servers_count, workstations_count) VALUES (?1, ?2, ?3, ?4, ?5)";
const INSERT_USER: &str = "INSERT OR REPLACE INTO users (user_id, full_name, department_id) VALUES (?1, ?2, ?3)";
const INSERT_DEPARTMENT: &str = "INSERT OR REPLACE INTO departments (department_id, name) VALUES (?1, ?2)";
const INSERT_MEASURE: &str =
    "INSERT OR REPLACE INTO measures (measure_id, name, service_name, process_id, category) VALUES (?1, ?2, ?3, ?4, ?5)";
const INSERT_PROCESS: &str = "INSERT OR REPLACE INTO processes (process_id, name) VALUES (?1, ?2)";
const INSERT_COMPANY: &str = "INSERT OR REPLACE INTO companies (company_id, name, rate_per_hour) VALUES (?1, ?2, ?3)";

/// Local copy of the collaborator data, replaced wholesale on import.
pub struct Snapshots {
    pub conn: Connection,
}

/// Decodes a snake_case enum stored as text.
fn decode<T: DeserializeOwned>(column: usize, raw: String) -> rusqlite::Result<T> {
    serde_json::from_value(serde_json::Value::String(raw))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

impl Snapshots {
    pub fn new() -> Result<Snapshots> {
        let db = Db::new()?;
        Ok(Snapshots { conn: db.conn })
    }

    pub fn from_db(db: Db) -> Self {
        Snapshots { conn: db.conn }
    }

    pub fn is_empty(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM plans", [], |row| row.get(0))?;
        Ok(count == 0)
    }

    /// Replaces everything stored with `dataset` in one transaction.
    pub fn replace(&mut self, dataset: &Dataset) -> Result<()> {
        let tx = self.conn.transaction()?;
        for table in TABLES {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }

        for plan in &dataset.plans {
            tx.execute(
                INSERT_PLAN,
                params![
                    plan.id,
                    encode(&plan.level)?,
                    plan.year,
                    plan.month,
                    plan.quarter,
                    plan.status.as_str(),
                    plan.distribution_type.as_ref().map(|d| d.as_str().to_string()),
                    plan.parent_id,
                    plan.measure_id,
                    plan.department_id,
                    plan.planned_hours
                ],
            )?;
        }
        for row in &dataset.task_hours {
            tx.execute(INSERT_TASK_HOURS, params![row.plan_id, row.user_id, row.total_spent_hours, row.tasks_count])?;
        }
        for row in &dataset.plan_companies {
            tx.execute(INSERT_PLAN_COMPANY, params![row.plan_id, row.company_id, row.company_name])?;
        }
        for row in &dataset.infrastructure {
            tx.execute(
                INSERT_INFRASTRUCTURE,
                params![row.company_id, row.period_year, row.period_month, row.servers_count, row.workstations_count],
            )?;
        }
        for user in &dataset.users {
            tx.execute(INSERT_USER, params![user.user_id, user.full_name, user.department_id])?;
        }
        for department in &dataset.departments {
            tx.execute(INSERT_DEPARTMENT, params![department.department_id, department.name])?;
        }
        for measure in &dataset.measures {
            tx.execute(
                INSERT_MEASURE,
                params![measure.measure_id, measure.name, measure.service_name, measure.process_id, measure.category],
            )?;
        }
        for process in &dataset.processes {
            tx.execute(INSERT_PROCESS, params![process.process_id, process.name])?;
        }
        for company in &dataset.companies {
            tx.execute(INSERT_COMPANY, params![company.company_id, company.name, company.rate_per_hour])?;
        }

        tx.commit()?;
        tracing::debug!(plans = dataset.plans.len(), task_hours = dataset.task_hours.len(), "snapshot stored");
        Ok(())
    }

    /// Loads the stored snapshot, preserving insertion order.
    pub fn load(&self) -> Result<Dataset> {
        let plans = self.collect(
            "SELECT id, level, year, month, quarter, status, distribution_type, parent_id, measure_id, department_id, planned_hours FROM plans ORDER BY rowid",
            |row| {
                Ok(Plan {
                    id: row.get(0)?,
                    level: decode(1, row.get(1)?)?,
                    year: row.get(2)?,
                    month: row.get(3)?,
                    quarter: row.get(4)?,
                    status: decode(5, row.get(5)?)?,
                    distribution_type: row.get::<_, Option<String>>(6)?.map(DistributionType::from),
                    parent_id: row.get(7)?,
                    measure_id: row.get(8)?,
                    department_id: row.get(9)?,
                    planned_hours: row.get(10)?,
                })
            },
        )?;
        let task_hours = self.collect(
            "SELECT plan_id, user_id, total_spent_hours, tasks_count FROM task_hours ORDER BY id",
            |row| {
                Ok(TaskHours {
                    plan_id: row.get(0)?,
                    user_id: row.get(1)?,
                    total_spent_hours: row.get(2)?,
                    tasks_count: row.get(3)?,
                })
            },
        )?;
        let plan_companies = self.collect(
            "SELECT plan_id, company_id, company_name FROM plan_companies ORDER BY id",
            |row| Ok(PlanCompany { plan_id: row.get(0)?, company_id: row.get(1)?, company_name: row.get(2)? }),
        )?;
        let infrastructure = self.collect(
            "SELECT company_id, period_year, period_month, servers_count, workstations_count FROM infrastructure ORDER BY id",
            |row| {
                Ok(InfrastructureSnapshot {
                    company_id: row.get(0)?,
                    period_year: row.get(1)?,
                    period_month: row.get(2)?,
                    servers_count: row.get(3)?,
                    workstations_count: row.get(4)?,
                })
            },
        )?;
        let users = self.collect("SELECT user_id, full_name, department_id FROM users ORDER BY rowid", |row| {
            Ok(User { user_id: row.get(0)?, full_name: row.get(1)?, department_id: row.get(2)? })
        })?;
        let departments = self.collect("SELECT department_id, name FROM departments ORDER BY rowid", |row| {
            Ok(Department { department_id: row.get(0)?, name: row.get(1)? })
        })?;
        let measures = self.collect(
            "SELECT measure_id, name, service_name, process_id, category FROM measures ORDER BY rowid",
            |row| {
                Ok(Measure {
                    measure_id: row.get(0)?,
                    name: row.get(1)?,
                    service_name: row.get(2)?,
                    process_id: row.get(3)?,
                    category: row.get(4)?,
                })
            },
        )?;
        let processes = self.collect("SELECT process_id, name FROM processes ORDER BY rowid", |row| {
            Ok(Process { process_id: row.get(0)?, name: row.get(1)? })
        })?;
        let companies = self.collect("SELECT company_id, name, rate_per_hour FROM companies ORDER BY rowid", |row| {
            Ok(Company { company_id: row.get(0)?, name: row.get(1)?, rate_per_hour: row.get(2)? })
        })?;

        Ok(Dataset {
            plans,
            task_hours,
            plan_companies,
            infrastructure,
            users,
            departments,
            measures,
            processes,
            companies,
        })
    }

    fn collect<T, F>(&self, sql: &str, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], map)?.collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }
}
