// src/table/mod.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};

use crate::reference::REQUIRED_COLUMNS;

/// One submission file as it sits on disk: the header row plus every record
/// as raw strings. Nothing is interpreted at this layer; a file that cannot
/// be read or is not well-formed CSV is a hard error.
#[derive(Debug)]
pub struct RawTable {
    /// Column names as the file claims them, in file order.
    pub columns: Vec<String>,
    /// One entry per data row, one string per field.
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = rdr
            .headers()
            .context("reading CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for record in rdr.records() {
            let record = record.context("reading CSV record")?;
            records.push(record.iter().map(str::to_string).collect());
        }

        Ok(RawTable { columns, records })
    }

    /// Every non-empty cell of `column`, in file order. Empty when the column
    /// does not exist.
    pub fn column(&self, column: &str) -> Vec<&str> {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => self
                .records
                .iter()
                .filter_map(|r| r.get(idx).map(String::as_str))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// One typed row of a submission. Dates are parsed leniently: the raw text is
/// kept alongside the parsed value so that format problems surface as
/// validation findings instead of aborting the load.
#[derive(Debug, Clone)]
pub struct ForecastRow {
    pub location: String,
    pub age_group: String,
    pub forecast_date_raw: String,
    pub forecast_date: Option<NaiveDate>,
    pub target_end_date_raw: String,
    pub target_end_date: Option<NaiveDate>,
    pub target: String,
    pub row_type: String,
    /// Raw quantile cell; `None` for an empty cell (mean rows).
    pub quantile: Option<String>,
    /// Raw value cell; `None` for an empty cell.
    pub value: Option<String>,
    pub pathogen: String,
}

/// The typed view of a [`RawTable`]. Deriving it fails when a required column
/// is absent; the caller treats that as a recoverable per-check failure, not
/// a fatal one, since the header check reports the missing columns itself.
#[derive(Debug)]
pub struct ForecastTable {
    pub rows: Vec<ForecastRow>,
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

impl ForecastTable {
    pub fn from_raw(raw: &RawTable) -> Result<Self> {
        let mut idx = [0usize; 9];
        for (i, col) in REQUIRED_COLUMNS.iter().enumerate() {
            idx[i] = raw
                .columns
                .iter()
                .position(|c| c == col)
                .with_context(|| format!("required column `{}` is missing", col))?;
        }

        let field = |record: &[String], i: usize| -> String {
            record.get(idx[i]).cloned().unwrap_or_default()
        };
        let optional = |record: &[String], i: usize| -> Option<String> {
            record
                .get(idx[i])
                .filter(|s| !s.is_empty())
                .cloned()
        };

        let rows = raw
            .records
            .iter()
            .map(|record| {
                let forecast_date_raw = field(record, 2);
                let target_end_date_raw = field(record, 3);
                ForecastRow {
                    location: field(record, 0),
                    age_group: field(record, 1),
                    forecast_date: parse_date(&forecast_date_raw),
                    forecast_date_raw,
                    target_end_date: parse_date(&target_end_date_raw),
                    target_end_date_raw,
                    target: field(record, 4),
                    row_type: field(record, 5),
                    quantile: optional(record, 6),
                    value: optional(record, 7),
                    pathogen: field(record, 8),
                }
            })
            .collect();

        Ok(ForecastTable { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
location,age_group,forecast_date,target_end_date,target,type,quantile,value,pathogen
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,mean,,1400,COVID-19
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,quantile,0.5,1420,COVID-19
";

    #[test]
    fn parses_header_and_records() {
        let raw = RawTable::from_reader(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(raw.columns.len(), 9);
        assert_eq!(raw.records.len(), 2);
        assert_eq!(raw.column("location"), vec!["DE", "DE"]);
        assert!(raw.column("no_such_column").is_empty());
    }

    #[test]
    fn typed_rows_carry_parsed_dates_and_optionals() {
        let raw = RawTable::from_reader(Cursor::new(SAMPLE)).unwrap();
        let table = ForecastTable::from_raw(&raw).unwrap();

        let mean = &table.rows[0];
        assert_eq!(mean.forecast_date, NaiveDate::from_ymd_opt(2024, 1, 8));
        assert_eq!(mean.quantile, None);
        assert_eq!(mean.value.as_deref(), Some("1400"));

        let quant = &table.rows[1];
        assert_eq!(quant.quantile.as_deref(), Some("0.5"));
        assert_eq!(
            quant.target_end_date,
            NaiveDate::from_ymd_opt(2024, 1, 14)
        );
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let sample = "\
location,age_group,forecast_date,target_end_date,target,type,quantile,value
DE,00+,2024-01-08,2024-01-14,1 wk ahead inc hosp,mean,,1400
";
        let raw = RawTable::from_reader(Cursor::new(sample)).unwrap();
        let err = ForecastTable::from_raw(&raw).unwrap_err();
        assert!(err.to_string().contains("pathogen"));
    }

    #[test]
    fn unparseable_date_is_kept_raw() {
        let sample = "\
location,age_group,forecast_date,target_end_date,target,type,quantile,value,pathogen
DE,00+,08.01.2024,2024-01-14,1 wk ahead inc hosp,mean,,1400,COVID-19
";
        let raw = RawTable::from_reader(Cursor::new(sample)).unwrap();
        let table = ForecastTable::from_raw(&raw).unwrap();
        assert_eq!(table.rows[0].forecast_date, None);
        assert_eq!(table.rows[0].forecast_date_raw, "08.01.2024");
    }

    #[test]
    fn ragged_record_is_fatal() {
        let sample = "\
location,age_group,forecast_date,target_end_date,target,type,quantile,value,pathogen
DE,00+,2024-01-08
";
        assert!(RawTable::from_reader(Cursor::new(sample)).is_err());
    }
}
