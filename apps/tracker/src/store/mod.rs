//! Persistence for postings, keyed by listing URL.
//!
//! `upsert` is insert-or-ignore: a URL that is already stored is never
//! rewritten, so re-scraping is idempotent. The unique constraint on `url`
//! is the only concurrency mechanism writes rely on.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::job::{JobRow, JobStatus, NewPosting};

pub use memory::MemoryJobStore;
pub use postgres::PgJobStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

/// Predicate over stored postings. Every field is optional; `None` means
/// "don't filter on this".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    /// Exact match on the stored company.
    pub company: Option<String>,
    /// Exact match on the stored location.
    pub location: Option<String>,
    /// Case-insensitive substring over title, company and location.
    pub search: Option<String>,
}

impl JobFilter {
    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Evaluates the filter against an in-memory row. Mirrors the SQL
    /// predicate built by the Postgres store.
    pub fn matches(&self, row: &JobRow) -> bool {
        if self.status.is_some_and(|status| status != row.status) {
            return false;
        }
        if self.company.as_deref().is_some_and(|c| c != row.company) {
            return false;
        }
        if self.location.as_deref().is_some_and(|l| l != row.location) {
            return false;
        }
        if let Some(needle) = self.search.as_deref() {
            let needle = needle.to_lowercase();
            return [&row.title, &row.company, &row.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }
        true
    }
}

/// Per-status counts over a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: u64,
    pub not_applied: u64,
    pub applied: u64,
    pub interviewed: u64,
    pub offer: u64,
}

impl StatusCounts {
    pub fn record(&mut self, status: JobStatus, count: u64) {
        self.total += count;
        match status {
            JobStatus::NotApplied => self.not_applied += count,
            JobStatus::Applied => self.applied += count,
            JobStatus::Interviewed => self.interviewed += count,
            JobStatus::Offer => self.offer += count,
        }
    }
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Creates the table and indexes if they are absent. Safe on every startup.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Inserts the posting unless its URL is already stored.
    /// Returns `true` only when a new row was written.
    async fn upsert(&self, posting: &NewPosting) -> Result<bool, StoreError>;

    /// All matching rows, newest first.
    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobRow>, StoreError>;

    /// One window of matching rows, newest first.
    async fn list_page(
        &self,
        filter: &JobFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobRow>, StoreError>;

    async fn status_counts(&self, filter: &JobFilter) -> Result<StatusCounts, StoreError>;

    /// Counts over the filtered view together with one window of it. A window
    /// that starts at or past `total` is empty and never reaches `list_page`.
    ///
    /// This default issues two independent reads, so a concurrent insert can
    /// land between them. Both bundled stores override it to read from a
    /// single snapshot.
    async fn page_with_counts(
        &self,
        filter: &JobFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(StatusCounts, Vec<JobRow>), StoreError> {
        let counts = self.status_counts(filter).await?;
        if offset >= counts.total {
            return Ok((counts, Vec::new()));
        }
        let rows = self.list_page(filter, offset, limit).await?;
        Ok((counts, rows))
    }

    /// Status change by an external actor. Returns `false` if the id is unknown.
    async fn set_status(&self, id: i32, status: JobStatus) -> Result<bool, StoreError>;

    /// Administrative removal of one row. Never called by the pipeline.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}
