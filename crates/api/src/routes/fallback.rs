//! JSON 404 for unmatched routes.

use axum::extract::OriginalUri;
use axum::http::Method;

use crate::error::ApiError;

pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    tracing::debug!(%method, %uri, "no route matched");
    ApiError::NotFound(format!("Route {method} {uri} not found"))
}
