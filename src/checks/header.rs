// src/checks/header.rs

use anyhow::Result;

use super::{Finding, FindingKind};
use crate::reference::REQUIRED_COLUMNS;

const CHECK: &str = "header";

/// Compares the observed column set against the required one. Column order
/// is not checked; missing and unexpected columns are reported separately.
pub fn check(columns: &[String]) -> Result<Vec<Finding>> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|req| !columns.iter().any(|c| c == req))
        .collect();
    let unexpected: Vec<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|c| !REQUIRED_COLUMNS.contains(c))
        .collect();

    let mut findings = Vec::new();
    if !missing.is_empty() {
        findings.push(Finding::error(
            CHECK,
            FindingKind::MissingColumns,
            format!("the following columns are missing: {:?}; please add them", missing),
        ));
    }
    if !unexpected.is_empty() {
        findings.push(Finding::error(
            CHECK,
            FindingKind::UnexpectedColumns,
            format!(
                "the following columns are not accepted: {:?}; please remove them",
                unexpected
            ),
        ));
    }
    Ok(findings)
}
