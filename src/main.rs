use anyhow::{Context, Result};
use hubcheck::{
    checks::{self, Finding, FindingKind},
    github::{client::GithubClient, labels, pull_request_number, ChangedFiles, FileStatus},
};
use std::{collections::BTreeMap, env, path::PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const PREVIEW_URL: &str = "https://jobrac.shinyapps.io/check_nowcast_submission/?file=";

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let token = env::var("GH_TOKEN").context("GH_TOKEN not set")?;
    let repo = env::var("GITHUB_REPOSITORY").context("GITHUB_REPOSITORY not set")?;
    let event_path = env::var("GITHUB_EVENT_PATH").context("GITHUB_EVENT_PATH not set")?;
    info!(
        repo = %repo,
        event = %env::var("GITHUB_EVENT_NAME").unwrap_or_default(),
        "startup"
    );

    // ─── 2) find the pull request and its changed files ──────────────
    let pr = pull_request_number(&event_path)?;
    info!(pr, "validating pull request");

    let client = GithubClient::new(token, repo.clone());
    let changed = ChangedFiles::classify(client.list_pull_request_files(pr).await?);
    info!(
        forecasts = changed.forecasts.len(),
        metadata = changed.metadata.len(),
        raw_data = changed.raw_data.len(),
        other = changed.other.len(),
        "classified changed files"
    );

    // ─── 3) labels describing what the PR touches ────────────────────
    let mut pr_labels: Vec<&str> = Vec::new();
    if !changed.other.is_empty() && !changed.forecasts.is_empty() {
        pr_labels.push(labels::OTHER_FILES_UPDATED);
    }
    if !changed.metadata.is_empty() {
        pr_labels.push(labels::METADATA_CHANGE);
    }
    if !changed.raw_data.is_empty() {
        pr_labels.push(labels::ADDED_RAW_DATA);
    }
    if !changed.forecasts.is_empty() {
        pr_labels.push(labels::DATA_SUBMISSION);
    }

    let mut comment = String::new();
    if changed.has_deleted_forecasts() {
        pr_labels.push(labels::FORECAST_DELETED);
        comment.push_str(
            "\nYour submission seems to have deleted some forecasts. \
             Could you provide a reason for the deletion? Thank you!\n\n",
        );
    }
    if changed.has_updated_forecasts() {
        pr_labels.push(labels::FORECAST_UPDATED);
        comment.push_str(
            "\nYour submission seems to have updated or renamed some forecasts. \
             Could you provide a reason for the update? Thank you!\n\n",
        );
    }
    client.add_labels(pr, &pr_labels).await?;

    // ─── 4) download the submitted forecasts ─────────────────────────
    let work_dir = PathBuf::from("forecasts");
    for file in changed
        .forecasts
        .iter()
        .filter(|f| f.status != FileStatus::Removed)
    {
        let dest = work_dir.join(&file.filename);
        info!(file = %file.filename, "downloading");
        client.download_raw(&file.raw_url, &dest).await?;
    }

    // ─── 5) validate each downloaded file ────────────────────────────
    let mut all_errors: BTreeMap<String, Vec<Finding>> = BTreeMap::new();
    let pattern = format!("{}/**/*.csv", work_dir.display());
    for entry in glob::glob(&pattern).context("invalid forecast glob")? {
        let path = entry?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let findings = checks::validate_forecast_file(&path)
            .with_context(|| format!("validating {}", path.display()))?;

        for warning in findings.iter().filter(|f| !f.is_error()) {
            // Surfaces in the workflow log as an inline annotation.
            println!("::warning file={}::{}", name, warning.message);
        }

        let errors: Vec<Finding> = findings.into_iter().filter(Finding::is_error).collect();
        if !errors.is_empty() {
            all_errors.insert(name, errors);
        }
    }

    for misnamed in changed.misnamed_forecasts() {
        all_errors
            .entry(misnamed.filename.clone())
            .or_default()
            .push(Finding::error(
                "naming",
                FindingKind::Format,
                "file seems to violate the naming convention",
            ));
    }

    // ─── 6) report ───────────────────────────────────────────────────
    if all_errors.is_empty() {
        client.add_labels(pr, &[labels::AUTOMERGE]).await?;
        info!("no errors");
    } else {
        comment.push_str(&format!(
            "\n\nYour submission has some validation errors. Please check the logs of the \
             build under the [Checks](https://github.com/{}/pull/{}/checks) tab to get more \
             details about the error.",
            repo, pr
        ));
        for (filename, errors) in &all_errors {
            error!(file = %filename, count = errors.len(), "validation failed");
            for finding in errors {
                println!("- {}", finding.message);
                println!("-----------------------------");
            }
        }
    }

    if !comment.is_empty() {
        client.post_comment(pr, &comment).await?;
    }

    if !all_errors.is_empty() {
        anyhow::bail!("errors found in {} file(s)", all_errors.len());
    }

    // ─── 7) preview links for clean submissions ──────────────────────
    let previews: Vec<String> = changed
        .forecasts
        .iter()
        .filter(|f| f.status != FileStatus::Removed)
        .map(|f| format!("{}{}", PREVIEW_URL, f.raw_url))
        .collect();
    if !previews.is_empty() {
        let body = format!("Preview of submission:\n\n{}", previews.join("\n\n"));
        client.post_comment(pr, &body).await?;
    }

    info!("all done");
    Ok(())
}
