use crate::auth::TokenCodec;
use crate::error::ApiError;

use super::auth::{resolve_principal, Principal, PrincipalKind};

const WRONG_OWNER: &str =
    "You are not authorized to make changes to this resource because permissions belong to another user.";
const WRONG_KIND: &str =
    "You do not have the correct privileges to make changes to this resource because of your user type.";

/// Check that the caller owns the target resource before a mutation.
///
/// Resolves the raw header itself, so resolution failures come back as the
/// resolver's 401. A valid token for the wrong owner or the wrong kind of
/// principal is a 403.
pub fn authorize(
    codec: &TokenCodec,
    header: Option<&str>,
    required_identifier: &str,
    required_kind: PrincipalKind,
) -> Result<(), ApiError> {
    let principal = resolve_principal(codec, header)?;
    check_owner(&principal, required_identifier, required_kind)
}

/// Ownership comparison for an already resolved principal
pub fn check_owner(
    principal: &Principal,
    required_identifier: &str,
    required_kind: PrincipalKind,
) -> Result<(), ApiError> {
    if principal.identifier() != required_identifier {
        tracing::debug!(
            "Denied {:?} '{}' acting on resource owned by '{}'",
            principal.kind(),
            principal.identifier(),
            required_identifier
        );
        return Err(ApiError::forbidden(WRONG_OWNER));
    }

    if principal.kind() != required_kind {
        tracing::debug!(
            "Denied {:?} '{}': resource requires a {:?}",
            principal.kind(),
            principal.identifier(),
            required_kind
        );
        return Err(ApiError::forbidden(WRONG_KIND));
    }

    Ok(())
}

/// Kind-only check for actions that are not tied to an existing resource,
/// such as posting a job or applying to one
pub fn require_kind(
    principal: &Principal,
    required_kind: PrincipalKind,
    detail: &str,
) -> Result<(), ApiError> {
    if principal.kind() != required_kind {
        return Err(ApiError::forbidden(detail));
    }
    Ok(())
}
