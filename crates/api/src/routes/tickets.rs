//! Ticket CRUD and assignment endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::TicketId;
use domain::{AssignTicket, CreateTicket, ListTickets, UpdateTicket};
use store::Store;

use crate::envelope::{self, PaginatedEnvelope, SuccessEnvelope};
use crate::error::ApiError;
use crate::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::presenter::TicketResponse;
use crate::state::AppState;

/// GET /tickets: filtered, sorted and paginated listing.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedQuery(query): ValidatedQuery<ListTickets>,
) -> Result<PaginatedEnvelope<TicketResponse>, ApiError> {
    let page = state.tickets.list(query).await?;
    Ok(envelope::from_page("Tickets retrieved successfully", page, TicketResponse::from))
}

/// GET /tickets/{id}
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<TicketId>,
) -> Result<SuccessEnvelope<TicketResponse>, ApiError> {
    let ticket = state.tickets.get(id).await?;
    Ok(envelope::success("Ticket retrieved successfully", ticket.into()))
}

/// POST /tickets
#[tracing::instrument(skip(state, body))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(body): ValidatedJson<CreateTicket>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = state.tickets.create(body, None).await?;
    Ok((
        StatusCode::CREATED,
        envelope::success("Ticket created successfully", TicketResponse::from(ticket)),
    ))
}

/// PUT /tickets/{id}
#[tracing::instrument(skip(state, body))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<TicketId>,
    ValidatedJson(body): ValidatedJson<UpdateTicket>,
) -> Result<SuccessEnvelope<TicketResponse>, ApiError> {
    let ticket = state.tickets.update(id, body).await?;
    Ok(envelope::success("Ticket updated successfully", ticket.into()))
}

/// DELETE /tickets/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<TicketId>,
) -> Result<SuccessEnvelope<()>, ApiError> {
    state.tickets.delete(id).await?;
    Ok(envelope::success("Ticket deleted successfully", ()))
}

/// POST /tickets/{id}/assign
#[tracing::instrument(skip(state))]
pub async fn assign<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<TicketId>,
    ValidatedJson(body): ValidatedJson<AssignTicket>,
) -> Result<SuccessEnvelope<TicketResponse>, ApiError> {
    let ticket = state.tickets.assign(id, body).await?;
    Ok(envelope::success("Ticket assigned successfully", ticket.into()))
}
