//! Extractors that run the schema of the target type before deserializing.
//!
//! Handlers receive values that already passed validation with unknown keys
//! stripped and defaults filled in. Any failure is reported as a
//! `VALIDATION_ERROR` envelope.

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validation::{FieldError, HasSchema, ValidationErrors};

use crate::error::ApiError;

fn reject(errors: ValidationErrors) -> ApiError {
    metrics::counter!("validation_failures_total").increment(1);
    tracing::debug!(%errors, "request rejected");
    ApiError::Validation(errors)
}

/// `source` names the request part (`body` or `query`) blamed when the
/// normalized value still does not fit `T`.
fn validated<T: HasSchema + DeserializeOwned>(payload: Value, source: &str) -> Result<T, ApiError> {
    let normalized = T::schema().validate(&payload).map_err(reject)?;
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| reject(ValidationErrors::single(FieldError::new(source, e.to_string()))))
}

/// JSON body checked against `T::schema()`.
///
/// An empty body counts as an empty object so required-field errors are
/// reported instead of a parse error.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: HasSchema + DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid("body", rejection.body_text()))?;

        let payload = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::invalid("body", format!("Malformed JSON: {e}")))?
        };

        validated(payload, "body").map(ValidatedJson)
    }
}

/// Query string checked against `T::schema()`. Values arrive as strings
/// and are coerced by the schema; a repeated key keeps its last value.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: HasSchema + DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::invalid("query", rejection.body_text()))?;

        let payload = params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect::<serde_json::Map<_, _>>();

        validated(Value::Object(payload), "query").map(ValidatedQuery)
    }
}

/// A positive integer `{id}` path segment parsed into a typed identifier.
#[derive(Debug, Clone, Copy)]
pub struct IdPath<I>(pub I);

impl<S, I> FromRequestParts<S> for IdPath<I>
where
    S: Send + Sync,
    I: FromStr + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::invalid("id", rejection.body_text()))?;

        raw.parse()
            .map(IdPath)
            .map_err(|_| ApiError::invalid("id", "\"id\" must be a positive integer"))
    }
}
