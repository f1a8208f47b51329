//! Query layer: paginated, filtered views over the store plus statistics
//! and filter options, all computed per request.

pub mod handlers;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::classifier::LevelTag;
use crate::models::job::JobView;
use crate::store::{JobFilter, JobStore, StatusCounts, StoreError};

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 200;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A validated page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    page: u64,
    page_size: u64,
    pub filter: JobFilter,
}

impl JobQuery {
    /// `page` is 1-based; `page_size` must be within `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u64, page_size: u64, filter: JobFilter) -> Result<Self, QueryError> {
        if page == 0 {
            return Err(QueryError::Invalid("page must be at least 1".to_string()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(QueryError::Invalid(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self {
            page,
            page_size,
            filter,
        })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filter: JobFilter::default(),
        }
    }
}

/// Dropdown options derived from the rows of the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub companies: Vec<String>,
    pub locations: Vec<String>,
    pub levels: Vec<LevelTag>,
}

impl Facets {
    pub fn from_items(items: &[JobView]) -> Self {
        let mut companies = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut levels = BTreeSet::new();
        for item in items {
            companies.insert(item.company.clone());
            if !item.location.is_empty() {
                locations.insert(item.location.clone());
            }
            levels.extend(item.levels.iter().copied());
        }
        Self {
            companies: companies.into_iter().collect(),
            locations: locations.into_iter().collect(),
            levels: levels.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobPage {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
    pub items: Vec<JobView>,
    pub stats: StatusCounts,
    pub facets: Facets,
}

pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Runs a page request. `total` and `stats` describe the whole filtered
/// view, not just the returned page, and come from the same read as the
/// items. A page past the end has no items and keeps `total`.
pub async fn query_jobs(store: &dyn JobStore, query: &JobQuery) -> Result<JobPage, QueryError> {
    let (stats, rows) = store
        .page_with_counts(&query.filter, query.offset(), query.page_size)
        .await?;

    let items: Vec<JobView> = rows.into_iter().map(JobView::from).collect();
    let facets = Facets::from_items(&items);

    Ok(JobPage {
        page: query.page,
        page_size: query.page_size,
        total: stats.total,
        total_pages: total_pages(stats.total, query.page_size),
        items,
        stats,
        facets,
    })
}

/// Every row of the filtered view, newest first. Feeds exports.
pub async fn all_jobs(store: &dyn JobStore, filter: &JobFilter) -> Result<Vec<JobView>, QueryError> {
    Ok(store
        .list(filter)
        .await?
        .into_iter()
        .map(JobView::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{JobStatus, NewPosting};
    use crate::store::MemoryJobStore;

    async fn seeded(count: usize) -> MemoryJobStore {
        let store = MemoryJobStore::new();
        for i in 0..count {
            store
                .upsert(&NewPosting {
                    title: if i % 2 == 0 {
                        "Software Engineer Intern".to_string()
                    } else {
                        "Data Analyst".to_string()
                    },
                    company: format!("Company {}", i % 3),
                    location: if i % 2 == 0 { "Remote" } else { "Austin, TX" }.to_string(),
                    job_type: String::new(),
                    url: format!("https://jobs.example/{i}"),
                    salary: None,
                })
                .await
                .unwrap();
        }
        store
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(382, 50), 8);
        assert_eq!(total_pages(400, 50), 8);
        assert_eq!(total_pages(401, 50), 9);
        assert_eq!(total_pages(0, 50), 0);
    }

    #[test]
    fn test_query_validation() {
        assert!(JobQuery::new(0, 50, JobFilter::default()).is_err());
        assert!(JobQuery::new(1, 0, JobFilter::default()).is_err());
        assert!(JobQuery::new(1, MAX_PAGE_SIZE + 1, JobFilter::default()).is_err());
        assert!(JobQuery::new(1, MAX_PAGE_SIZE, JobFilter::default()).is_ok());
    }

    #[tokio::test]
    async fn test_pagination_arithmetic() {
        let store = seeded(382).await;

        let query = JobQuery::new(8, 50, JobFilter::default()).unwrap();
        let page = query_jobs(&store, &query).await.unwrap();
        assert_eq!(page.total, 382);
        assert_eq!(page.total_pages, 8);
        assert_eq!(page.items.len(), 32);

        let query = JobQuery::new(9, 50, JobFilter::default()).unwrap();
        let page = query_jobs(&store, &query).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 382);
        assert_eq!(page.page, 9);
    }

    #[tokio::test]
    async fn test_huge_page_number_is_empty_not_an_error() {
        let store = seeded(3).await;
        let query = JobQuery::new(u64::MAX / 100, MAX_PAGE_SIZE, JobFilter::default()).unwrap();
        let page = query_jobs(&store, &query).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_status_filter_and_stats_agree() {
        let store = seeded(10).await;
        for id in [1, 4, 7] {
            store.set_status(id, JobStatus::Applied).await.unwrap();
        }

        let query = JobQuery::new(1, 50, JobFilter::with_status(JobStatus::Applied)).unwrap();
        let page = query_jobs(&store, &query).await.unwrap();

        assert!(page.items.iter().all(|item| item.status == JobStatus::Applied));
        assert_eq!(page.stats.applied, page.items.len() as u64);
        assert_eq!(page.stats.applied, 3);
        assert_eq!(page.stats.not_applied, 0);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_stats_cover_filtered_view_not_whole_store() {
        let store = seeded(10).await;
        store.set_status(2, JobStatus::Applied).await.unwrap();

        let filter = JobFilter {
            location: Some("Austin, TX".to_string()),
            ..JobFilter::default()
        };
        let page = query_jobs(&store, &JobQuery::new(1, 2, filter).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.stats.applied, 1);
        assert_eq!(page.stats.not_applied, 4);
    }

    #[tokio::test]
    async fn test_search_filter() {
        let store = seeded(6).await;
        let filter = JobFilter {
            search: Some("INTERN".to_string()),
            ..JobFilter::default()
        };
        let page = query_jobs(&store, &JobQuery::new(1, 50, filter).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|item| item.title.contains("Intern")));
    }

    #[tokio::test]
    async fn test_facets_come_from_returned_items() {
        let store = seeded(4).await;
        let page = query_jobs(&store, &JobQuery::default()).await.unwrap();

        assert_eq!(
            page.facets.companies,
            vec!["Company 0", "Company 1", "Company 2"]
        );
        assert_eq!(page.facets.locations, vec!["Austin, TX", "Remote"]);
        assert_eq!(
            page.facets.levels,
            vec![LevelTag::Intern, LevelTag::EntryLevel]
        );
    }

    #[tokio::test]
    async fn test_items_carry_derived_levels() {
        let store = seeded(2).await;
        let jobs = all_jobs(&store, &JobFilter::default()).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].levels, vec![LevelTag::EntryLevel]);
        assert_eq!(jobs[1].levels, vec![LevelTag::Intern]);
    }
}
