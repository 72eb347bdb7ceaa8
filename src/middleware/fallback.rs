use axum::{
    extract::Request,
    http::{header::ALLOW, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Router fallback for paths no route matches
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(
        "Resource Not Found",
        format!("{} is not valid path to a LinkedList API resource.", uri.path()),
    )
}

/// Replace axum's empty 405 with the JSON error body, keeping the `Allow` header
pub async fn method_not_allowed(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut replaced =
        ApiError::method_not_allowed(format!("{} method is not supported at {}.", method, path)).into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(ALLOW, allow);
    }
    replaced
}
