// src/checks/mod.rs
//
// The validation pipeline: six independent sub-checks over one parsed
// submission, run in a fixed order. A failing check never stops the
// remaining checks; only an unreadable or structurally malformed file
// aborts the whole call.

pub mod column_values;
pub mod filename;
pub mod header;
pub mod quantiles;
pub mod target_dates;
pub mod values;

use anyhow::Result;
use chrono::{FixedOffset, NaiveDate, Utc};
use std::fmt;
use std::path::Path;

use crate::table::{ForecastTable, RawTable};

/// The category of a finding, for programmatic inspection; the message is
/// what submitters see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    Format,
    MultiValue,
    Mismatch,
    Weekday,
    Staleness,
    MissingColumns,
    UnexpectedColumns,
    InvalidColumnValue,
    MissingValue,
    NonNumeric,
    TargetDateMismatch,
    IncompleteQuantileSet,
    CheckFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational; never blocks a submission.
    Warning,
    Error,
}

/// One validation result for one file, produced by a named sub-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub check: &'static str,
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(check: &'static str, kind: FindingKind, message: impl Into<String>) -> Self {
        Finding {
            check,
            kind,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(check: &'static str, kind: FindingKind, message: impl Into<String>) -> Self {
        Finding {
            check,
            kind,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// True when any finding in `findings` is error severity.
pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(Finding::is_error)
}

/// Per-check error boundary: any `Err` from a sub-check becomes a
/// `CheckFailed` finding naming the check, so one broken check can never
/// keep the remaining checks from running.
fn run_safely<F>(check: &'static str, f: F, out: &mut Vec<Finding>)
where
    F: FnOnce() -> Result<Vec<Finding>>,
{
    match f() {
        Ok(mut findings) => out.append(&mut findings),
        Err(err) => out.push(check_failed(check, &err)),
    }
}

fn check_failed(check: &'static str, err: &anyhow::Error) -> Finding {
    Finding::error(
        check,
        FindingKind::CheckFailed,
        format!("check `{}` could not complete: {:#}", check, err),
    )
}

/// The civil date in Berlin, with DST ignored: at day granularity the fixed
/// +01:00 offset is close enough for the staleness window.
pub fn today_berlin() -> NaiveDate {
    let berlin = FixedOffset::east_opt(3600).expect("offset in range");
    Utc::now().with_timezone(&berlin).date_naive()
}

/// Validate one submission file against today's date. An empty result (or
/// one containing only warnings) means the file is accepted; findings come
/// back in check order. Only reading or parsing the file itself can fail.
pub fn validate_forecast_file(path: impl AsRef<Path>) -> Result<Vec<Finding>> {
    validate_forecast_file_at(path, today_berlin())
}

/// Same as [`validate_forecast_file`] with an injectable `today`, so the
/// staleness window is testable.
pub fn validate_forecast_file_at(path: impl AsRef<Path>, today: NaiveDate) -> Result<Vec<Finding>> {
    let path = path.as_ref();
    let raw = RawTable::load(path)?;
    let mut findings = Vec::new();

    run_safely(
        "forecast_date",
        || Ok(filename::check_with_today(path, &raw, today).into_iter().collect()),
        &mut findings,
    );
    run_safely("header", || header::check(&raw.columns), &mut findings);

    match ForecastTable::from_raw(&raw) {
        Ok(table) => {
            run_safely("column_values", || column_values::check(&table), &mut findings);
            run_safely("values", || values::check(&table), &mut findings);
            run_safely("target_dates", || target_dates::check(&table), &mut findings);
            run_safely("quantiles", || quantiles::check(&table), &mut findings);
        }
        Err(err) => {
            // The typed checks all need the full column set; the header
            // check above already told the submitter what is missing.
            for check in ["column_values", "values", "target_dates", "quantiles"] {
                findings.push(check_failed(check, &err));
            }
        }
    }

    Ok(findings)
}

/// Distinct values of an iterator in first-seen order.
pub(crate) fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const VALID: &str = "\
location,age_group,forecast_date,target_end_date,target,type,quantile,value,pathogen
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,mean,,1400,COVID-19
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,quantile,0.025,1000,COVID-19
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,quantile,0.1,1100,COVID-19
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,quantile,0.25,1200,COVID-19
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,quantile,0.5,1400,COVID-19
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,quantile,0.75,1600,COVID-19
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,quantile,0.9,1700,COVID-19
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,quantile,0.975,1800,COVID-19
";

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    fn write_submission(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn valid_file_yields_no_findings() {
        let dir = TempDir::new().unwrap();
        let path = write_submission(&dir, "2024-01-08-test.csv", VALID);
        let findings = validate_forecast_file_at(&path, monday()).unwrap();
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }

    #[test]
    fn validation_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_submission(
            &dir,
            "2024-01-09-test.csv",
            &VALID.replace("2024-01-14", "2024-01-15"),
        );
        let first = validate_forecast_file_at(&path, monday()).unwrap();
        let second = validate_forecast_file_at(&path, monday()).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn missing_column_degrades_typed_checks_only() {
        let dropped = VALID
            .replace(",pathogen", "")
            .replace(",COVID-19", "");
        let dir = TempDir::new().unwrap();
        let path = write_submission(&dir, "2024-01-08-test.csv", &dropped);
        let findings = validate_forecast_file_at(&path, monday()).unwrap();

        // One header finding plus one CheckFailed per typed check.
        assert_eq!(
            findings
                .iter()
                .filter(|f| f.kind == FindingKind::MissingColumns)
                .count(),
            1
        );
        assert_eq!(
            findings
                .iter()
                .filter(|f| f.kind == FindingKind::CheckFailed)
                .count(),
            4
        );
    }

    #[test]
    fn unreadable_file_is_a_hard_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("2024-01-08-nope.csv");
        assert!(validate_forecast_file_at(&missing, monday()).is_err());
    }
}
