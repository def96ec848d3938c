//! Uniform response envelopes.
//!
//! Every body the API returns is one of three shapes: a success envelope
//! wrapping a single payload, a paginated envelope wrapping a list, or an
//! error envelope carrying a machine-readable [`ErrorCode`]. All three carry
//! `status` and an ISO-8601 `timestamp`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use store::Page;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation successful";
pub const DEFAULT_PAGINATED_MESSAGE: &str = "Data retrieved successfully";
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Unauthorized,
    Conflict,
    ServerError,
}

impl ErrorCode {
    /// HTTP status this category is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(crate) fn timestamp() -> String {
    validation::format_date(&Utc::now())
}

fn message_or(message: String, default: &str) -> String {
    if message.is_empty() {
        default.to_string()
    } else {
        message
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope<T> {
    pub status: Status,
    pub message: String,
    pub data: T,
    pub meta: Map<String, Value>,
    pub timestamp: String,
}

/// Wraps `data` in a success envelope. An empty message becomes
/// [`DEFAULT_SUCCESS_MESSAGE`].
pub fn success<T>(message: impl Into<String>, data: T) -> SuccessEnvelope<T> {
    SuccessEnvelope {
        status: Status::Success,
        message: message_or(message.into(), DEFAULT_SUCCESS_MESSAGE),
        data,
        meta: Map::new(),
        timestamp: timestamp(),
    }
}

impl<T> SuccessEnvelope<T> {
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

impl<T: Serialize> IntoResponse for SuccessEnvelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub status: Status,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: String,
}

/// Builds an error envelope. An empty message becomes
/// [`DEFAULT_ERROR_MESSAGE`].
pub fn error(code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> ErrorEnvelope {
    ErrorEnvelope {
        status: Status::Error,
        code,
        message: message_or(message.into(), DEFAULT_ERROR_MESSAGE),
        details,
        timestamp: timestamp(),
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (self.code.status_code(), Json(self)).into_response()
    }
}

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Partially known pagination, merged over the defaults by [`PaginationParams::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub total_items: Option<u64>,
    pub total_pages: Option<u64>,
}

impl PaginationParams {
    /// Fills missing fields: page 1, limit 10, no items. A missing page
    /// count is derived from the item count and limit.
    pub fn resolve(self) -> Pagination {
        let limit = self.limit.unwrap_or(10);
        let total_items = self.total_items.unwrap_or(0);
        let total_pages = self.total_pages.unwrap_or(if limit == 0 {
            0
        } else {
            total_items.div_ceil(limit)
        });
        Pagination {
            page: self.page.unwrap_or(1),
            limit,
            total_items,
            total_pages,
        }
    }
}

impl<T> From<&Page<T>> for PaginationParams {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: Some(u64::from(page.page)),
            limit: Some(u64::from(page.limit)),
            total_items: Some(page.total_items),
            total_pages: Some(page.total_pages()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedEnvelope<T> {
    pub status: Status,
    pub message: String,
    pub data: Vec<T>,
    pub pagination: Pagination,
    pub meta: Map<String, Value>,
    pub timestamp: String,
}

/// Wraps a list and its pagination. An empty message becomes
/// [`DEFAULT_PAGINATED_MESSAGE`].
pub fn paginated<T>(
    message: impl Into<String>,
    data: Vec<T>,
    pagination: PaginationParams,
) -> PaginatedEnvelope<T> {
    PaginatedEnvelope {
        status: Status::Success,
        message: message_or(message.into(), DEFAULT_PAGINATED_MESSAGE),
        data,
        pagination: pagination.resolve(),
        meta: Map::new(),
        timestamp: timestamp(),
    }
}

/// Converts a repository page into a paginated envelope, mapping each item.
pub fn from_page<T, U>(message: impl Into<String>, page: Page<T>, f: impl FnMut(T) -> U) -> PaginatedEnvelope<U> {
    let params = PaginationParams::from(&page);
    paginated(message, page.items.into_iter().map(f).collect(), params)
}

impl<T: Serialize> IntoResponse for PaginatedEnvelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use store::PageRequest;

    use super::*;

    #[test]
    fn success_shape() {
        let body = serde_json::to_value(success("Ticket retrieved successfully", json!({"id": 1})))
            .unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Ticket retrieved successfully");
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["meta"], json!({}));
        assert!(validation::parse_iso_date(body["timestamp"].as_str().unwrap()).is_some());
    }

    #[test]
    fn empty_messages_use_defaults() {
        assert_eq!(success("", ()).message, DEFAULT_SUCCESS_MESSAGE);
        assert_eq!(error(ErrorCode::ServerError, "", None).message, DEFAULT_ERROR_MESSAGE);
        assert_eq!(
            paginated::<u8>("", vec![], PaginationParams::default()).message,
            DEFAULT_PAGINATED_MESSAGE
        );
    }

    #[test]
    fn unit_data_serializes_as_null() {
        let body = serde_json::to_value(success("Ticket deleted successfully", ())).unwrap();
        assert_eq!(body["data"], Value::Null);
    }

    #[test]
    fn meta_is_carried() {
        let body = serde_json::to_value(success("ok", 1).with_meta("requestId", "abc")).unwrap();
        assert_eq!(body["meta"], json!({ "requestId": "abc" }));
    }

    #[test]
    fn error_shape_omits_missing_details() {
        let body = serde_json::to_value(error(ErrorCode::NotFound, "Ticket with ID 9 not found", None))
            .unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body.get("details").is_none());

        let body = serde_json::to_value(error(
            ErrorCode::ValidationError,
            "Validation failed",
            Some(json!([{ "field": "title", "message": "\"title\" is required" }])),
        ))
        .unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["field"], "title");
    }

    #[test]
    fn codes_map_to_statuses() {
        assert_eq!(ErrorCode::ValidationError.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::ServerError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn pagination_defaults_and_derived_pages() {
        assert_eq!(
            PaginationParams::default().resolve(),
            Pagination { page: 1, limit: 10, total_items: 0, total_pages: 0 }
        );

        let derived = PaginationParams {
            page: Some(2),
            limit: Some(4),
            total_items: Some(9),
            total_pages: None,
        }
        .resolve();
        assert_eq!(derived.total_pages, 3);

        let explicit = PaginationParams {
            total_items: Some(9),
            total_pages: Some(7),
            ..Default::default()
        }
        .resolve();
        assert_eq!(explicit.total_pages, 7);

        let zero_limit = PaginationParams {
            limit: Some(0),
            total_items: Some(5),
            ..Default::default()
        }
        .resolve();
        assert_eq!(zero_limit.total_pages, 0);
    }

    #[test]
    fn paginated_from_page() {
        let page = Page::new(vec![1, 2, 3], 23, &PageRequest::new(2, 3));
        let body = serde_json::to_value(from_page("Tickets retrieved successfully", page, |n| n * 10))
            .unwrap();
        assert_eq!(body["data"], json!([10, 20, 30]));
        assert_eq!(
            body["pagination"],
            json!({ "page": 2, "limit": 3, "totalItems": 23, "totalPages": 8 })
        );
    }
}
