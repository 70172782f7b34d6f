// src/github/client.rs

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde_json::json;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::PullRequestFile;

const API_BASE: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

/// Minimal REST client for the operations the workflow needs: listing a
/// pull request's files, applying labels, posting comments, and downloading
/// raw file contents.
pub struct GithubClient {
    client: Client,
    token: String,
    repo: String,
}

impl GithubClient {
    /// `repo` is the `owner/name` slug the workflow runs in.
    pub fn new(token: impl Into<String>, repo: impl Into<String>) -> Self {
        GithubClient {
            client: Client::new(),
            token: token.into(),
            repo: repo.into(),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header(header::USER_AGENT, "hubcheck")
            .header(header::ACCEPT, "application/vnd.github+json")
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(&self.token)
            .header(header::USER_AGENT, "hubcheck")
            .header(header::ACCEPT, "application/vnd.github+json")
    }

    /// Every changed file of the pull request, following pagination.
    pub async fn list_pull_request_files(&self, pr: u64) -> Result<Vec<PullRequestFile>> {
        let mut files = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!(
                "{}/repos/{}/pulls/{}/files?per_page={}&page={}",
                API_BASE, self.repo, pr, PER_PAGE, page
            );
            let batch: Vec<PullRequestFile> = self
                .get(&url)
                .send()
                .await
                .with_context(|| format!("GET {}", url))?
                .error_for_status()?
                .json()
                .await
                .context("decoding pull request file list")?;

            let done = batch.len() < PER_PAGE;
            files.extend(batch);
            if done {
                break;
            }
            page += 1;
        }
        debug!(pr, files = files.len(), "listed pull request files");
        Ok(files)
    }

    pub async fn add_labels(&self, pr: u64, labels: &[&str]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        let url = format!("{}/repos/{}/issues/{}/labels", API_BASE, self.repo, pr);
        self.post(&url)
            .json(&json!({ "labels": labels }))
            .send()
            .await
            .with_context(|| format!("POST {}", url))?
            .error_for_status()?;
        Ok(())
    }

    pub async fn post_comment(&self, pr: u64, body: &str) -> Result<()> {
        let url = format!("{}/repos/{}/issues/{}/comments", API_BASE, self.repo, pr);
        self.post(&url)
            .json(&json!({ "body": body }))
            .send()
            .await
            .with_context(|| format!("POST {}", url))?
            .error_for_status()?;
        Ok(())
    }

    /// Download one raw file to `dest_path`, creating parent directories.
    pub async fn download_raw(&self, raw_url: &str, dest_path: impl AsRef<Path>) -> Result<()> {
        let dest_path = dest_path.as_ref();
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let resp = self
            .get(raw_url)
            .send()
            .await
            .with_context(|| format!("GET {}", raw_url))?
            .error_for_status()?;
        let bytes = resp.bytes().await?;
        fs::write(dest_path, &bytes)
            .await
            .with_context(|| format!("writing {}", dest_path.display()))?;
        Ok(())
    }
}
