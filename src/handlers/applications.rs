use axum::extract::{rejection::QueryRejection, Path, Query, State};

use crate::api::{pagination, ListQuery, PaginationPolicy};
use crate::database::models::application::parse_application_id;
use crate::database::models::job::parse_job_id;
use crate::database::models::{Application, Job};
use crate::error::ApiError;
use crate::middleware::{require_kind, ApiResponse, ApiResult, Principal, PrincipalKind};
use crate::state::AppState;

fn job_missing(id: i32) -> ApiError {
    ApiError::not_found("Not Found", format!("No job with ID {} was found.", id))
}

fn application_hidden() -> ApiError {
    ApiError::not_found("Not Found", "No job application found.")
}

async fn load_job(state: &AppState, raw_id: &str) -> Result<Job, ApiError> {
    let id = parse_job_id(raw_id)?;
    state.jobs().find(id).await?.ok_or_else(|| job_missing(id))
}

/// Companies see applications to their own jobs; users see their own.
/// Anything else looks like a missing application.
fn can_see(principal: &Principal, job: &Job, application: &Application) -> bool {
    if application.job_id != job.id {
        return false;
    }
    match principal {
        Principal::Company(handle) => *handle == job.company,
        Principal::User(username) => *username == application.username,
    }
}

async fn load_visible_application(
    state: &AppState,
    principal: &Principal,
    raw_job_id: &str,
    raw_application_id: &str,
) -> Result<Application, ApiError> {
    let job = load_job(state, raw_job_id).await?;
    let id = parse_application_id(raw_application_id)?;

    let application = state.applications().find(id).await?.ok_or_else(|| {
        ApiError::not_found("Not Found", format!("No job application with ID {} was found.", id))
    })?;

    if !can_see(principal, &job, &application) {
        tracing::debug!(
            "Hid application {} from {:?} '{}'",
            id,
            principal.kind(),
            principal.identifier()
        );
        return Err(application_hidden());
    }
    Ok(application)
}

/// POST /jobs/:id/applications - users only, once per job
pub async fn apply(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
) -> ApiResult<Application> {
    let job_id = parse_job_id(&raw_id)?;
    require_kind(&principal, PrincipalKind::User, "Only users can apply for jobs.")?;

    let job = state.jobs().find(job_id).await?.ok_or_else(|| job_missing(job_id))?;

    let applications = state.applications();
    let username = principal.identifier();
    if applications.exists(job.id, username).await? {
        return Err(ApiError::conflict("You have already applied for this job."));
    }

    let application = applications.create(job.id, username).await?;
    tracing::info!("User '{}' applied to job {}", username, job.id);
    Ok(ApiResponse::created(application))
}

/// GET /jobs/:id/applications?offset=&limit=
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Application>> {
    let Query(query) = query?;
    let window = pagination::validate(
        query.offset.as_deref(),
        query.limit.as_deref(),
        PaginationPolicy::applications(&state.config.pagination),
    )
    .into_window()?;

    let job = load_job(&state, &raw_id).await?;

    let applications = match &principal {
        Principal::Company(handle) if *handle != job.company => {
            return Err(ApiError::forbidden(
                "You are not allowed to see applications for this job.",
            ));
        }
        Principal::Company(_) => state.applications().list_for_job(job.id, window).await?,
        Principal::User(username) => {
            state
                .applications()
                .list_for_job_and_user(job.id, username, window)
                .await?
        }
    };

    Ok(ApiResponse::success(applications))
}

/// GET /jobs/:id/applications/:application_id
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((raw_job_id, raw_application_id)): Path<(String, String)>,
) -> ApiResult<Application> {
    let application =
        load_visible_application(&state, &principal, &raw_job_id, &raw_application_id).await?;
    Ok(ApiResponse::success(application))
}

/// DELETE /jobs/:id/applications/:application_id - the applicant or the hiring company
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path((raw_job_id, raw_application_id)): Path<(String, String)>,
) -> ApiResult<Application> {
    let application =
        load_visible_application(&state, &principal, &raw_job_id, &raw_application_id).await?;

    let removed = state
        .applications()
        .delete(application.id)
        .await?
        .ok_or_else(application_hidden)?;

    tracing::info!(
        "{:?} '{}' withdrew application {}",
        principal.kind(),
        principal.identifier(),
        removed.id
    );
    Ok(ApiResponse::success(removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job {
            id: 7,
            title: "Engineer".to_string(),
            salary: "100k".to_string(),
            equity: None,
            company: "acme".to_string(),
        }
    }

    fn application(username: &str, job_id: i32) -> Application {
        Application {
            id: 3,
            username: username.to_string(),
            job_id,
        }
    }

    #[test]
    fn hiring_company_sees_any_applicant() {
        let principal = Principal::Company("acme".to_string());
        assert!(can_see(&principal, &job(), &application("alice", 7)));
    }

    #[test]
    fn other_company_sees_nothing() {
        let principal = Principal::Company("otherco".to_string());
        assert!(!can_see(&principal, &job(), &application("alice", 7)));
    }

    #[test]
    fn users_see_only_their_own_applications() {
        let alice = Principal::User("alice".to_string());
        assert!(can_see(&alice, &job(), &application("alice", 7)));
        assert!(!can_see(&alice, &job(), &application("bob", 7)));
    }

    #[test]
    fn application_must_belong_to_the_job_in_the_path() {
        let alice = Principal::User("alice".to_string());
        assert!(!can_see(&alice, &job(), &application("alice", 8)));
    }

    #[test]
    fn hidden_application_is_a_plain_not_found() {
        let err = application_hidden();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.detail, "No job application found.");
    }
}
