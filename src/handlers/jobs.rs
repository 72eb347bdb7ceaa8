use axum::extract::{rejection::QueryRejection, Path, Query, State};

use crate::api::{pagination, parse_body, parse_update, update_fields, JsonBody, ListQuery, PaginationPolicy};
use crate::database::models::job::{parse_job_id, JobUpdate, NewJob};
use crate::database::models::{Job, JobRepository};
use crate::database::PartialUpdate;
use crate::error::ApiError;
use crate::middleware::{check_owner, require_kind, resolve_principal, ApiResponse, ApiResult, AuthHeader, Principal, PrincipalKind};
use crate::state::AppState;

pub(crate) fn job_not_found(id: i32) -> ApiError {
    ApiError::not_found("Job Not Found", format!("No Job with ID '{}' found.", id))
}

/// Only the company that posted a job may change or remove it
fn ensure_job_owner(principal: &Principal, job: &Job) -> Result<(), ApiError> {
    check_owner(principal, &job.company, PrincipalKind::Company)
}

/// A company may only post jobs under its own handle
fn ensure_posting_company(principal: &Principal, company: &str) -> Result<(), ApiError> {
    if principal.identifier() != company {
        tracing::debug!(
            "Company '{}' tried to post a job for '{}'",
            principal.identifier(),
            company
        );
        return Err(ApiError::forbidden(
            "You are not allowed to post a job on behalf of that company.",
        ));
    }
    Ok(())
}

/// GET /jobs?search=&offset=&limit=
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Job>> {
    let Query(query) = query?;
    let window = pagination::validate(
        query.offset.as_deref(),
        query.limit.as_deref(),
        PaginationPolicy::resources(&state.config.pagination),
    )
    .into_window()?;

    let jobs = state.jobs().list(query.search(), window).await?;
    Ok(ApiResponse::success(jobs))
}

/// POST /jobs - companies post jobs on their own behalf
pub async fn create(State(state): State<AppState>, auth: AuthHeader, body: JsonBody) -> ApiResult<Job> {
    let principal = resolve_principal(&state.tokens, auth.as_deref())?;
    require_kind(&principal, PrincipalKind::Company, "Only companies are allowed to post jobs.")?;

    let new_job: NewJob = parse_body(body)?;
    ensure_posting_company(&principal, &new_job.company)?;

    // Tokens outlive accounts, so the company may be gone
    if !state.companies().exists(&new_job.company).await? {
        return Err(ApiError::not_found(
            "Company Not Found",
            format!("No Company with handle '{}' found.", new_job.company),
        ));
    }

    let job = state.jobs().create(&new_job).await?;
    tracing::info!("Company '{}' posted job {}", job.company, job.id);
    Ok(ApiResponse::created(job))
}

/// GET /jobs/:id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Job> {
    let id = parse_job_id(&raw_id)?;
    let job = state.jobs().find(id).await?.ok_or_else(|| job_not_found(id))?;
    Ok(ApiResponse::success(job))
}

/// PATCH /jobs/:id - owning company only; ownership is checked before the body
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    auth: AuthHeader,
    body: JsonBody,
) -> ApiResult<Job> {
    let id = parse_job_id(&raw_id)?;
    let principal = resolve_principal(&state.tokens, auth.as_deref())?;

    let jobs = state.jobs();
    let job = jobs.find(id).await?.ok_or_else(|| job_not_found(id))?;
    ensure_job_owner(&principal, &job)?;

    let changes: JobUpdate = parse_update(body)?;
    let fields = update_fields(&changes)?;
    let statement = PartialUpdate::build(JobRepository::TABLE, &fields, JobRepository::KEY, id)?;

    let job = jobs.update(&statement).await?.ok_or_else(|| job_not_found(id))?;
    Ok(ApiResponse::success(job))
}

/// DELETE /jobs/:id - owning company only
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    auth: AuthHeader,
) -> ApiResult<Job> {
    let id = parse_job_id(&raw_id)?;
    let principal = resolve_principal(&state.tokens, auth.as_deref())?;

    let jobs = state.jobs();
    let job = jobs.find(id).await?.ok_or_else(|| job_not_found(id))?;
    ensure_job_owner(&principal, &job)?;

    let job = jobs.delete(id).await?.ok_or_else(|| job_not_found(id))?;
    tracing::info!("Company '{}' removed job {}", job.company, job.id);
    Ok(ApiResponse::success(job))
}
