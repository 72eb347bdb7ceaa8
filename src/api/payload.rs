use axum::{extract::rejection::JsonRejection, Json};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Request bodies are taken as `Result<Json<Value>, JsonRejection>` so that
/// handlers can run their authorization checks before reporting a bad body.
pub type JsonBody = Result<Json<Value>, JsonRejection>;

/// Validation hook for typed request bodies
pub trait Payload: DeserializeOwned {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Turn a raw body into a validated payload, mapping every failure to a 400
pub fn parse_body<T: Payload>(body: JsonBody) -> Result<T, ApiError> {
    let Json(value) = body?;
    let payload: T = serde_json::from_value(value).map_err(|e| ApiError::bad_request(e.to_string()))?;
    payload.validate()?;
    Ok(payload)
}

/// Like [`parse_body`], for PATCH bodies. Every column a client may update
/// is optional, so an explicit `null` would otherwise be dropped silently.
pub fn parse_update<T: Payload>(body: JsonBody) -> Result<T, ApiError> {
    let Json(value) = body?;
    if let Value::Object(map) = &value {
        if let Some((field, _)) = map.iter().find(|(_, v)| v.is_null()) {
            return Err(ApiError::bad_request(format!("'{field}' must not be null.")));
        }
    }
    parse_body(Ok(Json(value)))
}

/// Ordered column map of the fields actually present in an update payload.
///
/// Payload structs skip `None` fields when serializing, so only the columns
/// the client sent end up here, in declaration order.
pub fn update_fields<T: Serialize>(payload: &T) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request("Request body must be a JSON object.")),
        Err(e) => {
            tracing::error!("Failed to serialize update payload: {}", e);
            Err(ApiError::internal_server_error("Failed to process update"))
        }
    }
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("'{field}' must not be empty.")));
    }
    Ok(())
}

/// Like [`require_non_empty`], for fields that may be omitted
pub fn optional_non_empty(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) => require_non_empty(field, v),
        None => Ok(()),
    }
}
