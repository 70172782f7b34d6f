// src/checks/column_values.rs

use anyhow::Result;

use super::{distinct, Finding, FindingKind};
use crate::reference::{
    LOCATION_CODES, VALID_AGE_GROUPS, VALID_PATHOGENS, VALID_QUANTILES, VALID_TARGETS,
    VALID_TYPES,
};
use crate::table::ForecastTable;

const CHECK: &str = "column_values";

/// Categorical validity: for each categorical column, the distinct observed
/// values minus the reference set, reported in first-seen order. Quantiles
/// are checked only over non-missing cells and compared numerically, so
/// `0.10` passes as `0.1`.
pub fn check(table: &ForecastTable) -> Result<Vec<Finding>> {
    let rows = &table.rows;

    let invalid_locations = invalid_in(rows.iter().map(|r| r.location.as_str()), LOCATION_CODES);
    let invalid_quantiles: Vec<&str> =
        distinct(rows.iter().filter_map(|r| r.quantile.as_deref()))
            .into_iter()
            .filter(|q| !is_valid_quantile(q))
            .collect();
    let invalid_types = invalid_in(rows.iter().map(|r| r.row_type.as_str()), VALID_TYPES);
    let invalid_age_groups =
        invalid_in(rows.iter().map(|r| r.age_group.as_str()), VALID_AGE_GROUPS);
    let valid_targets: Vec<&str> = VALID_TARGETS.iter().map(String::as_str).collect();
    let invalid_targets = invalid_in(rows.iter().map(|r| r.target.as_str()), &valid_targets);
    let invalid_pathogens =
        invalid_in(rows.iter().map(|r| r.pathogen.as_str()), VALID_PATHOGENS);

    let mut findings = Vec::new();
    report(&mut findings, "location", &invalid_locations);
    report(&mut findings, "quantile", &invalid_quantiles);
    report(&mut findings, "type", &invalid_types);
    report(&mut findings, "age_group", &invalid_age_groups);
    report(&mut findings, "target", &invalid_targets);
    report(&mut findings, "pathogen", &invalid_pathogens);
    Ok(findings)
}

fn invalid_in<'a>(values: impl Iterator<Item = &'a str>, valid: &[&str]) -> Vec<&'a str> {
    distinct(values)
        .into_iter()
        .filter(|v| !valid.contains(v))
        .collect()
}

fn is_valid_quantile(raw: &str) -> bool {
    match raw.parse::<f64>() {
        Ok(q) => VALID_QUANTILES.iter().any(|&v| (v - q).abs() < 1e-9),
        Err(_) => false,
    }
}

fn report(findings: &mut Vec<Finding>, column: &str, invalid: &[&str]) {
    if !invalid.is_empty() {
        findings.push(Finding::error(
            CHECK,
            FindingKind::InvalidColumnValue,
            format!("invalid entries in column `{}`: {:?}", column, invalid),
        ));
    }
}
