// src/github/mod.rs
//
// The thin glue between the validator and the pull request: event payload,
// changed-file classification, labels. The REST client lives in `client`.

pub mod client;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::{fs::File, path::Path};

/// Labels the workflow applies to a pull request.
pub mod labels {
    pub const DATA_SUBMISSION: &str = "data-submission";
    pub const OTHER_FILES_UPDATED: &str = "other-files-updated";
    pub const METADATA_CHANGE: &str = "metadata-change";
    pub const ADDED_RAW_DATA: &str = "added-raw-data";
    pub const FORECAST_DELETED: &str = "forecast-deleted";
    pub const FORECAST_UPDATED: &str = "forecast-updated";
    pub const AUTOMERGE: &str = "automerge";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    #[serde(other)]
    Other,
}

/// One changed file of a pull request, as the REST API reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    pub status: FileStatus,
    pub raw_url: String,
}

#[derive(Debug, Deserialize)]
struct EventPullRequest {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: EventPullRequest,
}

/// Pull request number from the workflow event payload at `path`.
pub fn pull_request_number(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("opening event payload {}", path.display()))?;
    let payload: EventPayload =
        serde_json::from_reader(file).context("decoding event payload")?;
    Ok(payload.pull_request.number)
}

// The team directory has to match the filename suffix; the regex crate has
// no backreferences, so the suffix comparison happens after the match.
static FORECAST_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data-processed(?:_retrospective)?/([^/]+)/\d{4}-\d{2}-\d{2}-(.+)\.csv$")
        .expect("forecast path pattern parses")
});
static METADATA_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data-processed/([^/]+)/metadata-(.+)\.txt$")
        .expect("metadata path pattern parses")
});

/// True for `data-processed[_retrospective]/<team>/<yyyy-mm-dd>-<team>.csv`.
pub fn is_forecast_path(path: &str) -> bool {
    FORECAST_PATH
        .captures(path)
        .map(|c| c[1] == c[2])
        .unwrap_or(false)
}

/// True for `data-processed/<team>/metadata-<team>.txt`.
pub fn is_metadata_path(path: &str) -> bool {
    METADATA_PATH
        .captures(path)
        .map(|c| c[1] == c[2])
        .unwrap_or(false)
}

fn is_membership_file(path: &str) -> bool {
    matches!(
        path.rsplit('/').next(),
        Some("documentation_members.csv") | Some("expected_members.csv")
    )
}

/// The changed files of one pull request, split the way the workflow treats
/// them.
#[derive(Debug, Default)]
pub struct ChangedFiles {
    pub forecasts: Vec<PullRequestFile>,
    pub metadata: Vec<PullRequestFile>,
    pub raw_data: Vec<PullRequestFile>,
    pub other: Vec<PullRequestFile>,
}

impl ChangedFiles {
    pub fn classify(files: Vec<PullRequestFile>) -> Self {
        let mut out = ChangedFiles::default();
        for file in files {
            if is_forecast_path(&file.filename) {
                out.forecasts.push(file);
            } else if is_metadata_path(&file.filename) {
                out.metadata.push(file);
            } else if file.filename.starts_with("data-raw") {
                out.raw_data.push(file);
            } else if !is_membership_file(&file.filename) {
                out.other.push(file);
            }
        }
        out
    }

    pub fn has_deleted_forecasts(&self) -> bool {
        self.forecasts
            .iter()
            .any(|f| f.status == FileStatus::Removed)
    }

    /// Forecasts that were changed or renamed rather than newly added.
    pub fn has_updated_forecasts(&self) -> bool {
        self.forecasts
            .iter()
            .any(|f| !matches!(f.status, FileStatus::Added | FileStatus::Removed))
    }

    /// CSVs under `data-processed/` that ended up in `other` violate the
    /// naming convention.
    pub fn misnamed_forecasts(&self) -> Vec<&PullRequestFile> {
        self.other
            .iter()
            .filter(|f| f.filename.starts_with("data-processed") && f.filename.ends_with(".csv"))
            .collect()
    }
}
