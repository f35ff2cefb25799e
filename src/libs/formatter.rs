//! Number formatting for tables and exports.
//!
//! Engine values stay unrounded; rounding happens only here, when a value is
//! turned into text or written to a file.
//!
//! ## Formats
//!
//! - hours, planned, cost: fixed decimals (`12.50`)
//! - tasks: integer when whole, otherwise fixed decimals (`3`, `1.50`)
//! - kpi: fixed decimals with a percent sign (`87.50%`)
//! - zero in any metric: an em dash placeholder (`—`)
//!
//! ```rust
//! use planboard::libs::formatter::{format_value, round2};
//! use planboard::libs::metric::Metric;
//!
//! assert_eq!(round2(3.336), 3.34);
//! assert_eq!(format_value(Metric::Kpi, 87.5, 2), "87.50%");
//! assert_eq!(format_value(Metric::Hours, 0.0, 2), "—");
//! ```

use super::metric::Metric;

pub const EMPTY_CELL: &str = "—";

/// Rounds to hundredths, half away from zero.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn format_number(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, round_to(value, decimals))
}

/// Display text of a metric value.
pub fn format_value(metric: Metric, value: f64, decimals: usize) -> String {
    if round_to(value, decimals) == 0.0 {
        return EMPTY_CELL.to_string();
    }
    match metric {
        Metric::Kpi => format!("{}%", format_number(value, decimals)),
        Metric::Tasks if value.fract() == 0.0 => format!("{}", value as i64),
        _ => format_number(value, decimals),
    }
}
