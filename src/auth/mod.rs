use std::collections::HashSet;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod password;

/// Identifying claim carried by a bearer token. Exactly one of the two is set.
///
/// No `exp` or `iat` is issued, so a signed token stays valid until the
/// secret changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenClaims {
    User { username: String },
    Company { handle: String },
}

impl TokenClaims {
    pub fn user(username: impl Into<String>) -> Self {
        TokenClaims::User {
            username: username.into(),
        }
    }

    pub fn company(handle: impl Into<String>) -> Self {
        TokenClaims::Company {
            handle: handle.into(),
        }
    }
}

/// Wire shape used while decoding, before the one-claim rule is enforced
#[derive(Debug, Deserialize)]
struct RawClaims {
    username: Option<String>,
    handle: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid JWT token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("Token carries neither a username nor a handle")]
    MissingClaim,

    #[error("Token carries both a username and a handle")]
    AmbiguousClaims,
}

/// HS256 signer/verifier over the process-wide secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are issued without registered claims
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(TokenError::Generation)
    }

    /// Verify the signature and return the single identifying claim
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<RawClaims>(token, &self.decoding_key, &self.validation).map_err(TokenError::Invalid)?;

        match (data.claims.username, data.claims.handle) {
            (Some(_), Some(_)) => Err(TokenError::AmbiguousClaims),
            (None, Some(handle)) if !handle.is_empty() => Ok(TokenClaims::Company { handle }),
            (Some(username), None) if !username.is_empty() => Ok(TokenClaims::User { username }),
            _ => Err(TokenError::MissingClaim),
        }
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}
