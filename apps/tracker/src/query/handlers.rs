use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::export;
use crate::models::job::JobStatus;
use crate::query::{all_jobs, query_jobs, JobPage, JobQuery, DEFAULT_PAGE_SIZE};
use crate::state::AppState;
use crate::store::JobFilter;

/// Query string shared by the listing and export endpoints.
/// Empty values are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct JobsParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub status: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number(name: &str, value: Option<String>, default: u64) -> Result<u64, AppError> {
    match present(value) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::Validation(format!("{name} must be a non-negative integer, got '{raw}'"))
        }),
    }
}

impl JobsParams {
    fn into_filter(self) -> Result<JobFilter, AppError> {
        let status = present(self.status)
            .map(|s| s.parse::<JobStatus>())
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(JobFilter {
            status,
            company: present(self.company),
            location: present(self.location),
            search: present(self.search),
        })
    }
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(mut params): Query<JobsParams>,
) -> Result<Json<JobPage>, AppError> {
    let page = parse_number("page", params.page.take(), 1)?;
    let page_size = parse_number("page_size", params.page_size.take(), DEFAULT_PAGE_SIZE)?;
    let query = JobQuery::new(page, page_size, params.into_filter()?)?;

    Ok(Json(query_jobs(state.store.as_ref(), &query).await?))
}

/// GET /api/jobs/export.csv
pub async fn handle_export_csv(
    State(state): State<AppState>,
    Query(params): Query<JobsParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.into_filter()?;
    let jobs = all_jobs(state.store.as_ref(), &filter).await?;
    let body = export::to_csv_bytes(&jobs)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV export failed: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"job_applications.csv\"",
            ),
        ],
        body,
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: JobStatus,
}

/// PATCH /api/jobs/:id/status
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<StatusUpdate>,
) -> Result<StatusCode, AppError> {
    if !state.store.set_status(id, req.status).await? {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete(id).await? {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
