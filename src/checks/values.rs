// src/checks/values.rs

use anyhow::Result;

use super::{Finding, FindingKind};
use crate::table::ForecastTable;

const CHECK: &str = "values";

/// Row-level value validity: a count of missing `value` cells and the
/// literal non-numeric entries. The two conditions are independent and may
/// both fire for the same table. Decimal values are fine; anything `f64`
/// will not parse is not.
pub fn check(table: &ForecastTable) -> Result<Vec<Finding>> {
    let missing = table.rows.iter().filter(|r| r.value.is_none()).count();
    let non_numeric: Vec<&str> = table
        .rows
        .iter()
        .filter_map(|r| r.value.as_deref())
        .filter(|v| v.parse::<f64>().is_err())
        .collect();

    let mut findings = Vec::new();
    if missing > 0 {
        findings.push(Finding::error(
            CHECK,
            FindingKind::MissingValue,
            format!(
                "missing values in column `value` are not allowed: {} value(s) missing",
                missing
            ),
        ));
    }
    if !non_numeric.is_empty() {
        findings.push(Finding::error(
            CHECK,
            FindingKind::NonNumeric,
            format!(
                "non-numeric entries in column `value` are not allowed: {:?}",
                non_numeric
            ),
        ));
    }
    Ok(findings)
}
