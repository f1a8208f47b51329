use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{JobFilter, JobStore, StatusCounts, StoreError};
use crate::models::job::{JobRow, JobStatus, NewPosting};

#[derive(Default)]
struct Inner {
    rows: Vec<JobRow>,
    next_id: i32,
}

/// In-process `JobStore` with the same conflict and ordering rules as the
/// Postgres store. Used by tests and for running the API without a database.
#[derive(Default)]
pub struct MemoryJobStore {
    inner: RwLock<Inner>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut rows: Vec<JobRow>) -> Vec<JobRow> {
        rows.sort_by(|a, b| b.date_added.cmp(&a.date_added).then(b.id.cmp(&a.id)));
        rows
    }

    fn window(rows: Vec<JobRow>, offset: u64, limit: u64) -> Vec<JobRow> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        rows.into_iter().skip(offset).take(limit).collect()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn upsert(&self, posting: &NewPosting) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.rows.iter().any(|row| row.url == posting.url) {
            return Ok(false);
        }
        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        let date_added = inner
            .rows
            .last()
            .map_or(now, |last| last.date_added.max(now));
        inner.rows.push(JobRow {
            id,
            title: posting.title.clone(),
            company: posting.company.clone(),
            location: posting.location.clone(),
            salary: posting.salary.clone(),
            job_type: posting.job_type.clone(),
            url: posting.url.clone(),
            date_added,
            status: JobStatus::default(),
        });
        Ok(true)
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobRow>, StoreError> {
        let inner = self.inner.read().await;
        let rows = inner
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        Ok(Self::sorted(rows))
    }

    async fn list_page(
        &self,
        filter: &JobFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobRow>, StoreError> {
        let rows = self.list(filter).await?;
        Ok(Self::window(rows, offset, limit))
    }

    async fn status_counts(&self, filter: &JobFilter) -> Result<StatusCounts, StoreError> {
        let inner = self.inner.read().await;
        let mut counts = StatusCounts::default();
        for row in inner.rows.iter().filter(|row| filter.matches(row)) {
            counts.record(row.status, 1);
        }
        Ok(counts)
    }

    async fn page_with_counts(
        &self,
        filter: &JobFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(StatusCounts, Vec<JobRow>), StoreError> {
        // One read guard covers both the counts and the rows.
        let inner = self.inner.read().await;
        let mut counts = StatusCounts::default();
        let mut rows = Vec::new();
        for row in inner.rows.iter().filter(|row| filter.matches(row)) {
            counts.record(row.status, 1);
            rows.push(row.clone());
        }
        Ok((counts, Self::window(Self::sorted(rows), offset, limit)))
    }

    async fn set_status(&self, id: i32, status: JobStatus) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner.rows.retain(|row| row.id != id);
        Ok(inner.rows.len() < before)
    }
}
