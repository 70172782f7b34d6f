// src/checks/filename.rs

use chrono::{Datelike, NaiveDate, Weekday};
use std::path::Path;

use super::{today_berlin, Finding, FindingKind};
use crate::table::{parse_date, RawTable};

const CHECK: &str = "forecast_date";

/// Filename/date consistency. First-match-wins over the conditions below;
/// at most one finding comes back:
///
/// 1. the basename does not start with a `yyyy-mm-dd` date,
/// 2. the `forecast_date` column holds more than one distinct value,
/// 3. the single `forecast_date` value does not parse,
/// 4. filename date and column date differ,
/// 5. the filename date is not a Monday,
/// 6. the filename date is more than one day away from today (warning).
pub fn check(path: &Path, raw: &RawTable) -> Option<Finding> {
    check_with_today(path, raw, today_berlin())
}

pub fn check_with_today(path: &Path, raw: &RawTable, today: NaiveDate) -> Option<Finding> {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_date = match basename.get(..10).and_then(parse_date) {
        Some(d) => d,
        None => {
            return Some(Finding::error(
                CHECK,
                FindingKind::Format,
                format!("filename `{}` does not start with a yyyy-mm-dd date", basename),
            ))
        }
    };

    let dates = super::distinct(raw.column("forecast_date").into_iter());
    if dates.len() > 1 {
        return Some(Finding::error(
            CHECK,
            FindingKind::MultiValue,
            format!(
                "column `forecast_date` has multiple values: {:?}; the forecast date must be unique",
                dates
            ),
        ));
    }

    let column_date = match dates.first().copied().map(|d| (d, parse_date(d))) {
        Some((_, Some(d))) => d,
        Some((raw_value, None)) => {
            return Some(Finding::error(
                CHECK,
                FindingKind::Format,
                format!("`forecast_date` value `{}` is not a yyyy-mm-dd date", raw_value),
            ))
        }
        // Empty table: nothing to compare against, the filename date still
        // gets the weekday and staleness treatment below.
        None => file_date,
    };

    if file_date != column_date {
        return Some(Finding::error(
            CHECK,
            FindingKind::Mismatch,
            format!(
                "date of filename `{}` does not match forecast_date column ({})",
                basename, column_date
            ),
        ));
    }

    if file_date.weekday() != Weekday::Mon {
        return Some(Finding::error(
            CHECK,
            FindingKind::Weekday,
            format!(
                "{} is a {}; submissions must be dated on a Monday",
                file_date,
                file_date.weekday()
            ),
        ));
    }

    if (file_date - today).num_days().abs() > 1 {
        return Some(Finding::warning(
            CHECK,
            FindingKind::Staleness,
            format!(
                "the forecast is not made today: forecast date {}, today {}",
                file_date, today
            ),
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn table(csv: &str) -> RawTable {
        RawTable::from_reader(Cursor::new(csv)).unwrap()
    }

    fn single_date(date: &str) -> RawTable {
        table(&format!("forecast_date\n{}\n{}\n", date, date))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    #[test]
    fn monday_filename_matching_column_passes() {
        let raw = single_date("2024-01-08");
        let path = PathBuf::from("2024-01-08-team.csv");
        assert_eq!(check_with_today(&path, &raw, today()), None);
    }

    #[test]
    fn filename_without_date_is_a_format_error() {
        let raw = single_date("2024-01-08");
        let path = PathBuf::from("forecast-team.csv");
        let finding = check_with_today(&path, &raw, today()).unwrap();
        assert_eq!(finding.kind, FindingKind::Format);
    }

    #[test]
    fn multiple_forecast_dates_win_over_later_conditions() {
        // The second date is also a mismatch against the filename, but only
        // the multi-value condition is reported.
        let raw = table("forecast_date\n2024-01-08\n2024-01-09\n");
        let path = PathBuf::from("2024-01-08-team.csv");
        let finding = check_with_today(&path, &raw, today()).unwrap();
        assert_eq!(finding.kind, FindingKind::MultiValue);
    }

    #[test]
    fn unparseable_column_date_is_a_format_error() {
        let raw = single_date("08.01.2024");
        let path = PathBuf::from("2024-01-08-team.csv");
        let finding = check_with_today(&path, &raw, today()).unwrap();
        assert_eq!(finding.kind, FindingKind::Format);
    }

    #[test]
    fn filename_and_column_disagreement_is_a_mismatch() {
        let raw = single_date("2024-01-15");
        let path = PathBuf::from("2024-01-08-team.csv");
        let finding = check_with_today(&path, &raw, today()).unwrap();
        assert_eq!(finding.kind, FindingKind::Mismatch);
    }

    #[test]
    fn tuesday_submission_is_a_weekday_error() {
        let raw = single_date("2024-01-09");
        let path = PathBuf::from("2024-01-09-team.csv");
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let finding = check_with_today(&path, &raw, tuesday).unwrap();
        assert_eq!(finding.kind, FindingKind::Weekday);
    }

    #[test]
    fn stale_submission_is_a_warning_only() {
        let raw = single_date("2024-01-08");
        let path = PathBuf::from("2024-01-08-team.csv");
        let later = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let finding = check_with_today(&path, &raw, later).unwrap();
        assert_eq!(finding.kind, FindingKind::Staleness);
        assert!(!finding.is_error());
    }

    #[test]
    fn one_day_of_staleness_is_tolerated() {
        let raw = single_date("2024-01-08");
        let path = PathBuf::from("2024-01-08-team.csv");
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(check_with_today(&path, &raw, sunday), None);
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(check_with_today(&path, &raw, tuesday), None);
    }
}
