// src/checks/target_dates.rs

use anyhow::Result;
use chrono::Duration;

use super::{Finding, FindingKind};
use crate::table::ForecastTable;

const CHECK: &str = "target_dates";

/// Cross-field consistency between horizon and target date: for every row
/// the expected `target_end_date` is `forecast_date + horizon weeks - 1
/// day`, the horizon being the signed leading token of `target`. Violating
/// rows are reported once per distinct `(forecast_date, target_end_date,
/// target)` triple, in one tabular finding.
///
/// Rows whose horizon or `forecast_date` cannot be parsed are skipped here;
/// the column-value and filename checks already cover those. An unparseable
/// `target_end_date` counts as a violation.
pub fn check(table: &ForecastTable) -> Result<Vec<Finding>> {
    let mut violations: Vec<(String, String, String)> = Vec::new();

    for row in &table.rows {
        let horizon = match parse_horizon(&row.target) {
            Some(h) => h,
            None => continue,
        };
        let forecast_date = match row.forecast_date {
            Some(d) => d,
            None => continue,
        };
        let expected = forecast_date + Duration::weeks(horizon) - Duration::days(1);
        if row.target_end_date == Some(expected) {
            continue;
        }

        let triple = (
            row.forecast_date_raw.clone(),
            row.target_end_date_raw.clone(),
            row.target.clone(),
        );
        if !violations.contains(&triple) {
            violations.push(triple);
        }
    }

    if violations.is_empty() {
        return Ok(Vec::new());
    }

    let mut message = String::from("the following target_end_date values are wrong:\n\n");
    message.push_str(&format!(
        "{:<14} {:<16} {}\n",
        "forecast_date", "target_end_date", "target"
    ));
    for (forecast_date, target_end_date, target) in &violations {
        message.push_str(&format!(
            "{:<14} {:<16} {}\n",
            forecast_date, target_end_date, target
        ));
    }

    Ok(vec![Finding::error(
        CHECK,
        FindingKind::TargetDateMismatch,
        message.trim_end().to_string(),
    )])
}

/// Signed week offset from the leading token of a target, e.g.
/// `"-1 wk ahead inc hosp"` → `-1`.
pub fn parse_horizon(target: &str) -> Option<i64> {
    target.split_whitespace().next()?.parse().ok()
}
