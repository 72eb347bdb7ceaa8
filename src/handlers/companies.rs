use axum::extract::{rejection::QueryRejection, Path, Query, State};

use crate::api::{pagination, parse_body, parse_update, update_fields, JsonBody, ListQuery, PaginationPolicy};
use crate::auth::password::hash_password_blocking;
use crate::database::models::company::{CompanyUpdate, NewCompany};
use crate::database::models::{Company, CompanyDetail, CompanyRepository};
use crate::database::PartialUpdate;
use crate::error::ApiError;
use crate::middleware::{authorize, ApiResponse, ApiResult, AuthHeader, PrincipalKind};
use crate::state::AppState;

fn company_not_found(handle: &str) -> ApiError {
    ApiError::not_found(
        "Company Not Found",
        format!("No Company with handle '{}' found.", handle),
    )
}

/// GET /companies?search=&offset=&limit=
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Company>> {
    let Query(query) = query?;
    let window = pagination::validate(
        query.offset.as_deref(),
        query.limit.as_deref(),
        PaginationPolicy::resources(&state.config.pagination),
    )
    .into_window()?;

    let companies = state.companies().list(query.search(), window).await?;
    Ok(ApiResponse::success(companies))
}

/// POST /companies - register a company
pub async fn create(State(state): State<AppState>, body: JsonBody) -> ApiResult<Company> {
    let new_company: NewCompany = parse_body(body)?;

    let companies = state.companies();
    if companies.exists(&new_company.handle).await? {
        return Err(ApiError::conflict(format!(
            "There already exists a company with handle '{}'.",
            new_company.handle
        )));
    }

    let password_hash = hash_password_blocking(new_company.password.clone()).await?;
    let company = companies.create(&new_company, &password_hash).await?;

    tracing::info!("Registered company '{}'", company.handle);
    Ok(ApiResponse::created(company))
}

/// GET /companies/:handle - company with its employees and job ids
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<CompanyDetail> {
    let company = state
        .companies()
        .find(&handle)
        .await?
        .ok_or_else(|| company_not_found(&handle))?;

    let users = state.users().usernames_for_company(&handle).await?;
    let jobs = state.jobs().ids_for_company(&handle).await?;

    Ok(ApiResponse::success(CompanyDetail { company, users, jobs }))
}

/// PATCH /companies/:handle - owner company only
pub async fn update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    auth: AuthHeader,
    body: JsonBody,
) -> ApiResult<Company> {
    authorize(&state.tokens, auth.as_deref(), &handle, PrincipalKind::Company)?;

    let mut changes: CompanyUpdate = parse_update(body)?;
    if let Some(password) = changes.password.take() {
        changes.password = Some(hash_password_blocking(password).await?);
    }

    let fields = update_fields(&changes)?;
    let statement = PartialUpdate::build(
        CompanyRepository::TABLE,
        &fields,
        CompanyRepository::KEY,
        handle.as_str(),
    )?;

    let company = state
        .companies()
        .update(&statement)
        .await?
        .ok_or_else(|| company_not_found(&handle))?;

    Ok(ApiResponse::success(company))
}

/// DELETE /companies/:handle - owner company only
pub async fn delete(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    auth: AuthHeader,
) -> ApiResult<Company> {
    authorize(&state.tokens, auth.as_deref(), &handle, PrincipalKind::Company)?;

    let company = state
        .companies()
        .delete(&handle)
        .await?
        .ok_or_else(|| company_not_found(&handle))?;

    tracing::info!("Deleted company '{}'", company.handle);
    Ok(ApiResponse::success(company))
}
