//! HTTP API server for tickets, products and users.
//!
//! Every request body and query string is validated against a declared
//! schema before a handler runs, and every response is wrapped in a uniform
//! envelope. Includes liveness and detailed health checks, structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod health;
pub mod presenter;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed = origins.iter().filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        });
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Rewrites 500 bodies to include the cause when `expose` is set.
async fn attach_internal_detail(State(expose): State<bool>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if !expose {
        return response;
    }
    match response.extensions().get::<error::InternalDetail>() {
        Some(error::InternalDetail(detail)) => envelope::error(
            envelope::ErrorCode::ServerError,
            error::INTERNAL_MESSAGE,
            Some(serde_json::Value::String(detail.clone())),
        )
        .into_response(),
        None => response,
    }
}

fn resource_routes<S: Store>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(routes::health::basic::<S>))
        .route("/health/detailed", get(routes::health::detailed::<S>))
        .route(
            "/tickets",
            get(routes::tickets::list::<S>).post(routes::tickets::create::<S>),
        )
        .route(
            "/tickets/{id}",
            get(routes::tickets::get::<S>)
                .put(routes::tickets::update::<S>)
                .delete(routes::tickets::delete::<S>),
        )
        .route("/tickets/{id}/assign", post(routes::tickets::assign::<S>))
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::delete::<S>),
        )
        .route(
            "/users",
            get(routes::users::list::<S>).post(routes::users::create::<S>),
        )
        .route("/users/login", post(routes::users::login::<S>))
        .route(
            "/users/{id}",
            get(routes::users::get::<S>)
                .put(routes::users::update::<S>)
                .delete(routes::users::delete::<S>),
        )
        .route("/users/{id}/tickets", get(routes::users::tickets::<S>))
        .with_state(state)
}

/// Creates the Axum application router with all routes and shared state.
///
/// Resource routes are mounted under the configured API prefix; `/metrics`
/// stays at the root.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    let prefix = match state.config.api_prefix.trim_matches('/') {
        "" => String::new(),
        trimmed => format!("/{trimmed}"),
    };
    let cors = cors_layer(&state.config.allowed_origins);
    let expose_details = state.config.exposes_error_details();

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let api = resource_routes(state);
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    router
        .merge(metrics_router)
        .fallback(routes::fallback::not_found)
        .layer(middleware::from_fn_with_state(expose_details, attach_internal_detail))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: services over `store` and a
/// health aggregator probing it.
pub fn create_default_state<S: Store>(store: S, config: Config) -> Arc<AppState<S>> {
    Arc::new(AppState::from_config(config, store))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;
    use crate::error::ApiError;

    async fn failing() -> Result<(), ApiError> {
        Err(ApiError::Internal("pool timed out".into()))
    }

    async fn internal_error_body(expose: bool) -> serde_json::Value {
        let app = Router::new()
            .route("/boom", get(failing))
            .layer(middleware::from_fn_with_state(expose, attach_internal_detail));
        let response = app
            .oneshot(axum::http::Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_cause_shown_only_when_exposed() {
        let shown = internal_error_body(true).await;
        assert_eq!(shown["code"], "SERVER_ERROR");
        assert_eq!(shown["message"], "An unexpected error occurred");
        assert_eq!(shown["details"], "pool timed out");

        let hidden = internal_error_body(false).await;
        assert_eq!(hidden["message"], "An unexpected error occurred");
        assert!(hidden.get("details").is_none());
    }
}
