// POST /user-auth and POST /company-auth - exchange credentials for a token

use axum::extract::State;
use serde::Serialize;

use crate::api::{parse_body, JsonBody};
use crate::auth::password::verify_password_blocking;
use crate::auth::TokenClaims;
use crate::database::models::company::CompanyLogin;
use crate::database::models::user::UserLogin;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /user-auth - `{username, password}` → `{token}` with a username claim
pub async fn user_login(State(state): State<AppState>, body: JsonBody) -> ApiResult<TokenResponse> {
    let login: UserLogin = parse_body(body)?;

    let user = state.users().find(&login.username).await?.ok_or_else(|| {
        ApiError::not_found(
            "User Not Found",
            format!("User with username '{}' not found.", login.username),
        )
    })?;

    if !verify_password_blocking(login.password, user.password).await? {
        tracing::info!("Failed login for user '{}'", user.username);
        return Err(ApiError::unauthorized("Invalid password."));
    }

    let token = state.tokens.sign(&TokenClaims::user(user.username))?;
    Ok(ApiResponse::success(TokenResponse { token }))
}

/// POST /company-auth - `{handle, password}` → `{token}` with a handle claim
pub async fn company_login(State(state): State<AppState>, body: JsonBody) -> ApiResult<TokenResponse> {
    let login: CompanyLogin = parse_body(body)?;

    let company = state.companies().find(&login.handle).await?.ok_or_else(|| {
        ApiError::not_found(
            "Company Not Found",
            format!("Company with handle '{}' not found.", login.handle),
        )
    })?;

    if !verify_password_blocking(login.password, company.password).await? {
        tracing::info!("Failed login for company '{}'", company.handle);
        return Err(ApiError::unauthorized("Invalid password."));
    }

    let token = state.tokens.sign(&TokenClaims::company(company.handle))?;
    Ok(ApiResponse::success(TokenResponse { token }))
}
