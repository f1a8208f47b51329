//! Greenhouse job board API adapter.
//!
//! `GET {base}/{board}/jobs` returns every open posting of a board in one
//! response, so there is never a next page.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{RawPosting, SourceClient, SourceError, SourcePage};

pub const PROVIDER: &str = "greenhouse";
pub const DEFAULT_API_BASE: &str = "https://boards-api.greenhouse.io/v1/boards";

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    jobs: Vec<BoardJob>,
}

#[derive(Debug, Deserialize)]
struct BoardJob {
    title: Option<String>,
    absolute_url: Option<String>,
    location: Option<BoardLocation>,
    #[serde(default)]
    metadata: Option<Vec<BoardMetadata>>,
}

#[derive(Debug, Deserialize)]
struct BoardLocation {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoardMetadata {
    value: Option<Value>,
}

impl From<BoardJob> for RawPosting {
    fn from(job: BoardJob) -> Self {
        // Employment type lives in the first metadata entry carrying a string value.
        let job_type = job
            .metadata
            .unwrap_or_default()
            .into_iter()
            .find_map(|m| m.value.and_then(|v| v.as_str().map(str::to_string)));

        RawPosting {
            title: job.title,
            company: None,
            location: job.location.and_then(|l| l.name),
            job_type,
            url: job.absolute_url,
        }
    }
}

/// Parses a board response body into raw postings.
pub fn parse_board(body: &str) -> Result<Vec<RawPosting>, SourceError> {
    let board: BoardResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;
    Ok(board.jobs.into_iter().map(RawPosting::from).collect())
}

#[derive(Clone)]
pub struct GreenhouseClient {
    client: Client,
    base_url: String,
    host: String,
}

impl GreenhouseClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = reqwest::Url::parse(base_url)
            .with_context(|| format!("Invalid Greenhouse API base '{base_url}'"))?;
        let host = parsed
            .host_str()
            .with_context(|| format!("Greenhouse API base '{base_url}' has no host"))?
            .to_string();

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            host,
        })
    }

    fn board_url(&self, source_id: &str) -> String {
        format!("{}/{}/jobs", self.base_url, source_id)
    }
}

#[async_trait]
impl SourceClient for GreenhouseClient {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn host(&self) -> &str {
        &self.host
    }

    async fn fetch_page(
        &self,
        source_id: &str,
        _cursor: Option<&str>,
    ) -> Result<SourcePage, SourceError> {
        let url = self.board_url(source_id);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let postings = parse_board(&body)?;
        debug!("{source_id}: {} postings", postings.len());

        Ok(SourcePage {
            postings,
            next_cursor: None,
        })
    }
}
