//! Source clients, one external listing provider per implementation.
//!
//! A client only knows how to fetch one page of raw postings for one source
//! identifier. Draining pages, courtesy spacing, timeouts and retries are
//! applied uniformly by the discovery pipeline.

pub mod greenhouse;
pub mod rate_limit;
pub mod registry;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::job::NewPosting;

pub use greenhouse::GreenhouseClient;
pub use rate_limit::HostRateLimiter;
pub use registry::{SourceRef, SourceRegistry, Targeting};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Status { status: u16 },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no client registered for provider '{0}'")]
    UnknownProvider(String),
}

impl SourceError {
    /// Failures worth retrying within the same run.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(e) => !e.is_decode(),
            SourceError::Status { status } => *status == 429 || *status >= 500,
            SourceError::Timeout(_) => true,
            SourceError::Decode(_) | SourceError::UnknownProvider(_) => false,
        }
    }
}

/// A posting as the provider returned it. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPosting {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("posting is missing required field '{0}'")]
pub struct MalformedPosting(pub &'static str);

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawPosting {
    /// Validates required fields. The company falls back to the source
    /// identifier when the provider doesn't name it.
    pub fn into_posting(self, source_id: &str) -> Result<NewPosting, MalformedPosting> {
        let title = non_blank(self.title).ok_or(MalformedPosting("title"))?;
        let url = non_blank(self.url).ok_or(MalformedPosting("url"))?;

        Ok(NewPosting {
            title,
            company: non_blank(self.company).unwrap_or_else(|| display_company(source_id)),
            location: non_blank(self.location).unwrap_or_default(),
            job_type: non_blank(self.job_type).unwrap_or_default(),
            url,
            salary: None,
        })
    }
}

/// One page of a source's postings. `next_cursor` is `None` on the last page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePage {
    pub postings: Vec<RawPosting>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Provider name as used in the registry's `target_platforms`.
    fn provider(&self) -> &str;

    /// Upstream host; courtesy spacing is enforced per host.
    fn host(&self) -> &str;

    async fn fetch_page(
        &self,
        source_id: &str,
        cursor: Option<&str>,
    ) -> Result<SourcePage, SourceError>;
}

/// "airbnb" -> "Airbnb", "scale-ai" -> "Scale Ai".
pub fn display_company(source_id: &str) -> String {
    source_id
        .split(['-', '_', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
