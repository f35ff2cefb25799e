//! Resolution of join records into grouping dimension values.
//!
//! Each requested [`Dimension`] maps a [`JoinRecord`] to an `(id, name)`
//! pair. References that are missing, or that point at entities absent from
//! the lookups, resolve to an `unknown-<dimension>` sentinel with a readable
//! label, so incomplete joins still land in a row instead of disappearing.
//!
//! Composite row keys join the ids with `::`; display labels join the names
//! with ` / `. Both depend only on the record and the requested order.

use super::error::{ReportError, ReportResult};
use super::plan::Lookups;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const KEY_SEPARATOR: &str = "::";
pub const LABEL_SEPARATOR: &str = " / ";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Company,
    Department,
    Employee,
    Process,
    Measure,
    Category,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Company => "company",
            Dimension::Department => "department",
            Dimension::Employee => "employee",
            Dimension::Process => "process",
            Dimension::Measure => "measure",
            Dimension::Category => "category",
        }
    }

    /// Column header used by tables and exports.
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Company => "Предприятие",
            Dimension::Department => "Отдел",
            Dimension::Employee => "Сотрудник",
            Dimension::Process => "Процесс",
            Dimension::Measure => "Мероприятие",
            Dimension::Category => "Категория",
        }
    }

    pub fn unknown_id(&self) -> String {
        format!("unknown-{}", self.as_str())
    }

    pub fn unknown_label(&self) -> &'static str {
        match self {
            Dimension::Company => "Без предприятия",
            Dimension::Department => "Без отдела",
            Dimension::Employee => "Неизвестно",
            Dimension::Process => "Без процесса",
            Dimension::Measure => "Без мероприятия",
            Dimension::Category => "Без категории",
        }
    }

    /// Parses a comma separated list such as `company,process`.
    pub fn parse_list(raw: &str) -> ReportResult<Vec<Dimension>> {
        let dims = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Dimension::from_str)
            .collect::<ReportResult<Vec<_>>>()?;
        if dims.is_empty() {
            return Err(ReportError::EmptyGroupBy);
        }
        Ok(dims)
    }
}

impl FromStr for Dimension {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        match s.trim() {
            "company" => Ok(Dimension::Company),
            "department" => Ok(Dimension::Department),
            "employee" => Ok(Dimension::Employee),
            "process" => Ok(Dimension::Process),
            "measure" => Ok(Dimension::Measure),
            "category" => Ok(Dimension::Category),
            other => Err(ReportError::UnknownDimension(other.to_string())),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct DimensionValue {
    pub id: String,
    pub name: String,
    pub dim_type: Dimension,
}

/// References carried by one observation. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinRecord<'a> {
    pub plan_id: &'a str,
    pub measure_id: Option<&'a str>,
    pub process_id: Option<&'a str>,
    pub company_id: Option<&'a str>,
    /// Company name carried by the plan↔company association, if any.
    pub company_name: Option<&'a str>,
    pub department_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
}

const DEFAULT_CATEGORY: &str = "operational";

fn category_label(category: &str) -> String {
    match category {
        "strategic" => "Стратегические".to_string(),
        "process" => "Процессные".to_string(),
        "operational" => "Оперативные".to_string(),
        other => other.to_string(),
    }
}

/// Resolves one dimension of a join record.
pub fn resolve(lookups: &Lookups<'_>, record: &JoinRecord<'_>, dimension: Dimension) -> DimensionValue {
    let unknown = || (dimension.unknown_id(), dimension.unknown_label().to_string());

    let (id, name) = match dimension {
        Dimension::Company => match record.company_id {
            Some(id) => {
                let name = lookups
                    .companies
                    .get(id)
                    .map(|c| c.name.as_str())
                    .or(record.company_name)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(dimension.unknown_label());
                (id.to_string(), name.to_string())
            }
            None => unknown(),
        },
        Dimension::Department => match record.department_id {
            Some(id) => {
                let name = lookups
                    .departments
                    .get(id)
                    .map(|d| d.name.as_str())
                    .unwrap_or(dimension.unknown_label());
                (id.to_string(), name.to_string())
            }
            None => unknown(),
        },
        Dimension::Employee => match record.user_id {
            Some(id) => {
                let name = lookups
                    .users
                    .get(id)
                    .and_then(|u| u.full_name.as_deref())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(dimension.unknown_label());
                (id.to_string(), name.to_string())
            }
            None => unknown(),
        },
        Dimension::Process => match record.process_id {
            Some(id) => {
                let name = lookups
                    .processes
                    .get(id)
                    .map(|p| p.name.as_str())
                    .unwrap_or(dimension.unknown_label());
                (id.to_string(), name.to_string())
            }
            None => unknown(),
        },
        Dimension::Measure => match record.measure_id {
            Some(id) => {
                let name = lookups
                    .measures
                    .get(id)
                    .map(|m| m.name.as_str())
                    .unwrap_or(dimension.unknown_label());
                (id.to_string(), name.to_string())
            }
            None => unknown(),
        },
        Dimension::Category => match record.measure_id.and_then(|id| lookups.measures.get(id)) {
            Some(measure) => {
                let category = measure
                    .category
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .unwrap_or(DEFAULT_CATEGORY);
                (category.to_string(), category_label(category))
            }
            None => unknown(),
        },
    };

    DimensionValue { id, name, dim_type: dimension }
}

/// Resolves every requested dimension, preserving the requested order.
pub fn resolve_all(lookups: &Lookups<'_>, record: &JoinRecord<'_>, dimensions: &[Dimension]) -> Vec<DimensionValue> {
    dimensions.iter().map(|dim| resolve(lookups, record, *dim)).collect()
}

/// Joins ids with [`KEY_SEPARATOR`]. `\` and `:` inside an id are
/// backslash-escaped so distinct id tuples never share a key.
pub fn join_key(ids: &[&str]) -> String {
    ids.iter().map(|id| escape_key_part(id)).collect::<Vec<_>>().join(KEY_SEPARATOR)
}

fn escape_key_part(id: &str) -> String {
    let mut escaped = String::with_capacity(id.len());
    for c in id.chars() {
        if c == '\\' || c == ':' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn composite_key(values: &[DimensionValue]) -> String {
    join_key(&values.iter().map(|v| v.id.as_str()).collect::<Vec<_>>())
}

pub fn display_label(values: &[DimensionValue]) -> String {
    values.iter().map(|v| v.name.as_str()).collect::<Vec<_>>().join(LABEL_SEPARATOR)
}
