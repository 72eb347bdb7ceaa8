use axum::extract::{rejection::QueryRejection, Path, Query, State};

use crate::api::{pagination, parse_body, parse_update, update_fields, JsonBody, ListQuery, PaginationPolicy};
use crate::auth::password::hash_password_blocking;
use crate::database::models::user::{NewUser, UserUpdate};
use crate::database::models::{User, UserDetail, UserRepository};
use crate::database::PartialUpdate;
use crate::error::ApiError;
use crate::middleware::{authorize, ApiResponse, ApiResult, AuthHeader, PrincipalKind};
use crate::state::AppState;

fn user_not_found(username: &str) -> ApiError {
    ApiError::not_found(
        "User Not Found",
        format!("No User with username '{}' found.", username),
    )
}

/// GET /users?search=&offset=&limit=
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<User>> {
    let Query(query) = query?;
    let window = pagination::validate(
        query.offset.as_deref(),
        query.limit.as_deref(),
        PaginationPolicy::resources(&state.config.pagination),
    )
    .into_window()?;

    let users = state.users().list(query.search(), window).await?;
    Ok(ApiResponse::success(users))
}

/// POST /users - register a user
pub async fn create(State(state): State<AppState>, body: JsonBody) -> ApiResult<User> {
    let new_user: NewUser = parse_body(body)?;

    let users = state.users();
    if users.exists(&new_user.username).await? {
        return Err(ApiError::conflict(format!(
            "There already exists a user with username '{}'.",
            new_user.username
        )));
    }

    let password_hash = hash_password_blocking(new_user.password.clone()).await?;
    let user = users.create(&new_user, &password_hash).await?;

    tracing::info!("Registered user '{}'", user.username);
    Ok(ApiResponse::created(user))
}

/// GET /users/:username - user with the ids of jobs applied to
pub async fn get(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<UserDetail> {
    let user = state
        .users()
        .find(&username)
        .await?
        .ok_or_else(|| user_not_found(&username))?;

    let jobs = state.applications().job_ids_for_user(&username).await?;

    Ok(ApiResponse::success(UserDetail { user, jobs }))
}

/// PATCH /users/:username - the user themself only
pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    auth: AuthHeader,
    body: JsonBody,
) -> ApiResult<User> {
    authorize(&state.tokens, auth.as_deref(), &username, PrincipalKind::User)?;

    let mut changes: UserUpdate = parse_update(body)?;
    if let Some(password) = changes.password.take() {
        changes.password = Some(hash_password_blocking(password).await?);
    }

    let fields = update_fields(&changes)?;
    let statement = PartialUpdate::build(
        UserRepository::TABLE,
        &fields,
        UserRepository::KEY,
        username.as_str(),
    )?;

    let user = state
        .users()
        .update(&statement)
        .await?
        .ok_or_else(|| user_not_found(&username))?;

    Ok(ApiResponse::success(user))
}

/// DELETE /users/:username - the user themself only
pub async fn delete(
    State(state): State<AppState>,
    Path(username): Path<String>,
    auth: AuthHeader,
) -> ApiResult<User> {
    authorize(&state.tokens, auth.as_deref(), &username, PrincipalKind::User)?;

    let user = state
        .users()
        .delete(&username)
        .await?
        .ok_or_else(|| user_not_found(&username))?;

    tracing::info!("Deleted user '{}'", user.username);
    Ok(ApiResponse::success(user))
}
