use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::{JobFilter, JobStore, StatusCounts, StoreError};
use crate::models::job::{JobRow, JobStatus, NewPosting};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS job_applications (
        id          SERIAL PRIMARY KEY,
        title       TEXT NOT NULL,
        company     TEXT NOT NULL,
        location    TEXT NOT NULL DEFAULT '',
        salary      TEXT,
        type        TEXT NOT NULL DEFAULT '',
        url         TEXT NOT NULL UNIQUE,
        date_added  TIMESTAMPTZ NOT NULL DEFAULT now(),
        status      TEXT NOT NULL DEFAULT 'Not Applied'
    )
    "#,
    "CREATE INDEX IF NOT EXISTS job_applications_date_added_idx ON job_applications (date_added DESC, id DESC)",
    "CREATE INDEX IF NOT EXISTS job_applications_status_idx ON job_applications (status)",
];

const SELECT_COLUMNS: &str =
    "SELECT id, title, company, location, salary, type, url, date_added, status FROM job_applications";

/// `JobStore` backed by the `job_applications` table.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE metacharacters so user input is matched literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a JobFilter) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(company) = filter.company.as_deref() {
        builder.push(" AND company = ").push_bind(company);
    }
    if let Some(location) = filter.location.as_deref() {
        builder.push(" AND location = ").push_bind(location);
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(r" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR company ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR location ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
}

fn to_i64(value: u64, what: &str) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidValue(format!("{what} out of range: {value}")))
}

async fn fetch_page<'e, E>(
    executor: E,
    filter: &JobFilter,
    offset: u64,
    limit: u64,
) -> Result<Vec<JobRow>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut builder = QueryBuilder::new(SELECT_COLUMNS);
    push_filter(&mut builder, filter);
    builder
        .push(" ORDER BY date_added DESC, id DESC LIMIT ")
        .push_bind(to_i64(limit, "limit")?)
        .push(" OFFSET ")
        .push_bind(to_i64(offset, "offset")?);

    Ok(builder.build_query_as::<JobRow>().fetch_all(executor).await?)
}

async fn fetch_counts<'e, E>(executor: E, filter: &JobFilter) -> Result<StatusCounts, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut builder = QueryBuilder::new("SELECT status, COUNT(*) FROM job_applications");
    push_filter(&mut builder, filter);
    builder.push(" GROUP BY status");

    let rows: Vec<(String, i64)> = builder.build_query_as().fetch_all(executor).await?;

    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        let status = status
            .parse::<JobStatus>()
            .map_err(|e| StoreError::InvalidValue(e.to_string()))?;
        let count = u64::try_from(count)
            .map_err(|_| StoreError::InvalidValue(format!("negative count {count}")))?;
        counts.record(status, count);
    }
    Ok(counts)
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Schema for job_applications is in place");
        Ok(())
    }

    async fn upsert(&self, posting: &NewPosting) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_applications (title, company, location, salary, type, url)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(&posting.title)
        .bind(&posting.company)
        .bind(&posting.location)
        .bind(&posting.salary)
        .bind(&posting.job_type)
        .bind(&posting.url)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() == 1;
        debug!(url = %posting.url, inserted, "upsert");
        Ok(inserted)
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobRow>, StoreError> {
        let mut builder = QueryBuilder::new(SELECT_COLUMNS);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY date_added DESC, id DESC");

        Ok(builder
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_page(
        &self,
        filter: &JobFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobRow>, StoreError> {
        fetch_page(&self.pool, filter, offset, limit).await
    }

    async fn status_counts(&self, filter: &JobFilter) -> Result<StatusCounts, StoreError> {
        fetch_counts(&self.pool, filter).await
    }

    async fn page_with_counts(
        &self,
        filter: &JobFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(StatusCounts, Vec<JobRow>), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let counts = fetch_counts(&mut *tx, filter).await?;
        let rows = if offset >= counts.total {
            Vec::new()
        } else {
            fetch_page(&mut *tx, filter, offset, limit).await?
        };
        tx.commit().await?;

        Ok((counts, rows))
    }

    async fn set_status(&self, id: i32, status: JobStatus) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE job_applications SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            info!("Job {id} moved to '{status}'");
        }
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM job_applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            info!("Job {id} deleted");
        }
        Ok(result.rows_affected() == 1)
    }
}
