use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::{TokenClaims, TokenCodec};
use crate::error::ApiError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Company,
}

/// Identity resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(String),
    /// Identified by the company handle
    Company(String),
}

impl Principal {
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::User(_) => PrincipalKind::User,
            Principal::Company(_) => PrincipalKind::Company,
        }
    }

    /// Username or handle
    pub fn identifier(&self) -> &str {
        match self {
            Principal::User(id) | Principal::Company(id) => id,
        }
    }
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        match claims {
            TokenClaims::User { username } => Principal::User(username),
            TokenClaims::Company { handle } => Principal::Company(handle),
        }
    }
}

/// Parse an `Authorization` header value into a principal.
///
/// Every failure is a 401: missing header, missing `Bearer ` prefix, or a
/// token that does not verify.
pub fn resolve_principal(codec: &TokenCodec, header: Option<&str>) -> Result<Principal, ApiError> {
    let header = header.ok_or_else(|| ApiError::unauthorized("Authorization header with valid token required."))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| ApiError::unauthorized("Authorization header must have format: `Bearer token`."))?;

    let claims = codec.decode(token.trim()).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Authorization header with valid token required.")
    })?;

    Ok(claims.into())
}

/// Raw `Authorization` header, if the request carried one
#[derive(Debug, Clone, Default)]
pub struct AuthHeader(pub Option<String>);

impl AuthHeader {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthHeader {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        Ok(AuthHeader(value))
    }
}

/// Extracting a `Principal` requires a valid bearer token
#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthHeader(header) = match AuthHeader::from_request_parts(parts, state).await {
            Ok(header) => header,
            Err(never) => match never {},
        };
        resolve_principal(&state.tokens, header.as_deref())
    }
}
