//! API error types with HTTP response mapping.

use axum::response::{IntoResponse, Response};
use domain::DomainError;
use validation::{FieldError, ValidationErrors};

use crate::envelope::{self, ErrorCode};

pub(crate) const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Cause of a 500 response, carried as a response extension. The body never
/// includes it; the app layer copies it into `details` when configured to.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

/// API-level error type that maps to an error envelope.
#[derive(Debug)]
pub enum ApiError {
    /// Payload, query or path failed validation.
    Validation(ValidationErrors),
    /// Resource not found.
    NotFound(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl ApiError {
    /// A single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(ValidationErrors::single(FieldError::new(field, message)))
    }

    fn into_envelope(self) -> envelope::ErrorEnvelope {
        match self {
            ApiError::Validation(errors) => {
                let details = serde_json::to_value(errors.into_errors()).ok();
                envelope::error(ErrorCode::ValidationError, "Validation failed", details)
            }
            ApiError::NotFound(msg) => envelope::error(ErrorCode::NotFound, msg, None),
            ApiError::Domain(err) => domain_error_to_envelope(err),
            ApiError::Internal(msg) => internal(&msg),
        }
    }

    fn internal_detail(&self) -> Option<String> {
        match self {
            ApiError::Internal(msg) => Some(msg.clone()),
            ApiError::Domain(
                err @ (DomainError::Store(_) | DomainError::PasswordHash(_) | DomainError::Task(_)),
            ) => Some(err.to_string()),
            _ => None,
        }
    }
}

fn internal(detail: &str) -> envelope::ErrorEnvelope {
    tracing::error!(error = %detail, "internal server error");
    metrics::counter!("http_internal_errors_total").increment(1);
    envelope::error(ErrorCode::ServerError, INTERNAL_MESSAGE, None)
}

fn domain_error_to_envelope(err: DomainError) -> envelope::ErrorEnvelope {
    match err {
        DomainError::NotFound { .. } => envelope::error(ErrorCode::NotFound, err.to_string(), None),
        DomainError::Conflict(msg) => envelope::error(ErrorCode::Conflict, msg, None),
        DomainError::InvalidCredentials => {
            envelope::error(ErrorCode::Unauthorized, err.to_string(), None)
        }
        DomainError::Store(_) | DomainError::PasswordHash(_) | DomainError::Task(_) => {
            internal(&err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.internal_detail();
        let mut response = self.into_envelope().into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(InternalDetail(detail));
        }
        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            status_of(DomainError::not_found("Ticket", 3).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::Conflict("User with this email already exists".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn validation_lists_every_field() {
        let envelope = ApiError::Validation(ValidationErrors::new(vec![
            FieldError::new("title", "\"title\" is required"),
            FieldError::new("description", "\"description\" is required"),
        ]))
        .into_envelope();

        assert_eq!(envelope.code, ErrorCode::ValidationError);
        assert_eq!(envelope.message, "Validation failed");
        let details = envelope.details.unwrap();
        assert_eq!(details.as_array().unwrap().len(), 2);
        assert_eq!(details[1]["field"], "description");
    }

    #[test]
    fn not_found_keeps_message() {
        let envelope = ApiError::from(DomainError::not_found("Product", 12)).into_envelope();
        assert_eq!(envelope.message, "Product with ID 12 not found");
        assert!(envelope.details.is_none());
    }

    #[test]
    fn internal_hides_cause_behind_generic_message() {
        let envelope = ApiError::Internal("pool timed out".into()).into_envelope();
        assert_eq!(envelope.code, ErrorCode::ServerError);
        assert_eq!(envelope.message, INTERNAL_MESSAGE);
        assert!(envelope.details.is_none());
    }

    #[test]
    fn internal_cause_travels_as_extension() {
        let response = ApiError::from(DomainError::Store(store::StoreError::Database(
            sqlx::Error::PoolTimedOut,
        )))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<InternalDetail>().unwrap();
        assert!(detail.0.starts_with("Store error: Database error"));

        let response = ApiError::from(DomainError::not_found("Ticket", 1)).into_response();
        assert!(response.extensions().get::<InternalDetail>().is_none());
    }
}
