//! Product CRUD endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ProductId;
use domain::{CreateProduct, ListProducts, UpdateProduct};
use store::Store;

use crate::envelope::{self, PaginatedEnvelope, SuccessEnvelope};
use crate::error::ApiError;
use crate::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::presenter::ProductResponse;
use crate::state::AppState;

pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedQuery(query): ValidatedQuery<ListProducts>,
) -> Result<PaginatedEnvelope<ProductResponse>, ApiError> {
    let page = state.products.list(query).await?;
    Ok(envelope::from_page("Products retrieved successfully", page, ProductResponse::from))
}

pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<ProductId>,
) -> Result<SuccessEnvelope<ProductResponse>, ApiError> {
    let product = state.products.get(id).await?;
    Ok(envelope::success("Product retrieved successfully", product.into()))
}

#[tracing::instrument(skip(state, body))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(body): ValidatedJson<CreateProduct>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.products.create(body).await?;
    Ok((
        StatusCode::CREATED,
        envelope::success("Product created successfully", ProductResponse::from(product)),
    ))
}

#[tracing::instrument(skip(state, body))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<ProductId>,
    ValidatedJson(body): ValidatedJson<UpdateProduct>,
) -> Result<SuccessEnvelope<ProductResponse>, ApiError> {
    let product = state.products.update(id, body).await?;
    Ok(envelope::success("Product updated successfully", product.into()))
}

#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<ProductId>,
) -> Result<SuccessEnvelope<()>, ApiError> {
    state.products.delete(id).await?;
    Ok(envelope::success("Product deleted successfully", ()))
}
