//! User management and login endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::UserId;
use domain::{CreateUser, ListUserTickets, ListUsers, Login, UpdateUser};
use store::Store;

use crate::envelope::{self, PaginatedEnvelope, SuccessEnvelope};
use crate::error::ApiError;
use crate::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::presenter::{TicketResponse, UserResponse};
use crate::state::AppState;

pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedQuery(query): ValidatedQuery<ListUsers>,
) -> Result<PaginatedEnvelope<UserResponse>, ApiError> {
    let page = state.users.list(query).await?;
    Ok(envelope::from_page("Users retrieved successfully", page, UserResponse::from))
}

pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<UserId>,
) -> Result<SuccessEnvelope<UserResponse>, ApiError> {
    let user = state.users.get(id).await?;
    Ok(envelope::success("User retrieved successfully", user.into()))
}

/// GET /users/{id}/tickets: tickets assigned to the user.
pub async fn tickets<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<UserId>,
    ValidatedQuery(ListUserTickets(page)): ValidatedQuery<ListUserTickets>,
) -> Result<PaginatedEnvelope<TicketResponse>, ApiError> {
    let page = state.tickets.list_for_user(id, page).await?;
    Ok(envelope::from_page("User tickets retrieved successfully", page, TicketResponse::from))
}

#[tracing::instrument(skip(state, body))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(body): ValidatedJson<CreateUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.create(body).await?;
    Ok((
        StatusCode::CREATED,
        envelope::success("User created successfully", UserResponse::from(user)),
    ))
}

#[tracing::instrument(skip(state, body))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<UserId>,
    ValidatedJson(body): ValidatedJson<UpdateUser>,
) -> Result<SuccessEnvelope<UserResponse>, ApiError> {
    let user = state.users.update(id, body).await?;
    Ok(envelope::success("User updated successfully", user.into()))
}

#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<UserId>,
) -> Result<SuccessEnvelope<()>, ApiError> {
    state.users.delete(id).await?;
    Ok(envelope::success("User deleted successfully", ()))
}

/// POST /users/login: verifies credentials and stamps the login time.
#[tracing::instrument(skip(state, body))]
pub async fn login<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(body): ValidatedJson<Login>,
) -> Result<SuccessEnvelope<UserResponse>, ApiError> {
    let user = state.users.login(body).await?;
    Ok(envelope::success("Login successful", user.into()))
}
