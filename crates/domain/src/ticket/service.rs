//! Ticket service.

use common::{Ticket, TicketId, UserId};
use store::{Page, PageRequest, Store};

use crate::error::DomainError;

use super::{AssignTicket, CreateTicket, ListTickets, UpdateTicket};

/// Service for managing tickets.
///
/// Referenced users (assignees) are checked before writing so a missing
/// user surfaces as `NotFound` rather than a storage error.
#[derive(Clone)]
pub struct TicketService<S: Store> {
    store: S,
}

impl<S: Store> TicketService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn ensure_user(&self, user_id: UserId) -> Result<(), DomainError> {
        match self.store.find_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("User", user_id)),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, query: ListTickets) -> Result<Page<Ticket>, DomainError> {
        let page = self
            .store
            .find_all_tickets(&query.filter(), &query.page())
            .await?;
        Ok(page)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: TicketId) -> Result<Ticket, DomainError> {
        self.store
            .find_ticket(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket", id))
    }

    /// Opens a ticket, optionally recording the creating user.
    #[tracing::instrument(skip(self, cmd), fields(title = %cmd.title))]
    pub async fn create(
        &self,
        cmd: CreateTicket,
        created_by: Option<UserId>,
    ) -> Result<Ticket, DomainError> {
        if let Some(assignee) = cmd.assignee_id {
            self.ensure_user(assignee).await?;
        }

        let ticket = self.store.create_ticket(cmd.into_new_ticket(created_by)).await?;
        metrics::counter!("tickets_created_total").increment(1);
        tracing::info!(ticket_id = %ticket.id, "ticket created");
        Ok(ticket)
    }

    #[tracing::instrument(skip(self, cmd))]
    pub async fn update(&self, id: TicketId, cmd: UpdateTicket) -> Result<Ticket, DomainError> {
        if let Some(assignee) = cmd.assignee_id {
            self.ensure_user(assignee).await?;
        }

        let ticket = self
            .store
            .update_ticket(id, cmd.into())
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket", id))?;
        metrics::counter!("tickets_updated_total").increment(1);
        Ok(ticket)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: TicketId) -> Result<(), DomainError> {
        if !self.store.delete_ticket(id).await? {
            return Err(DomainError::not_found("Ticket", id));
        }
        metrics::counter!("tickets_deleted_total").increment(1);
        Ok(())
    }

    /// Assigns a ticket to an existing user and marks it `assigned`.
    #[tracing::instrument(skip(self))]
    pub async fn assign(&self, id: TicketId, cmd: AssignTicket) -> Result<Ticket, DomainError> {
        if self.store.find_ticket(id).await?.is_none() {
            return Err(DomainError::not_found("Ticket", id));
        }
        self.ensure_user(cmd.assignee_id).await?;

        let ticket = self
            .store
            .assign_ticket(id, cmd.assignee_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket", id))?;
        metrics::counter!("tickets_assigned_total").increment(1);
        tracing::info!(ticket_id = %id, assignee_id = %cmd.assignee_id, "ticket assigned");
        Ok(ticket)
    }

    /// Tickets assigned to `user_id`; the user must exist.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Ticket>, DomainError> {
        self.ensure_user(user_id).await?;
        Ok(self.store.find_tickets_by_assignee(user_id, &page).await?)
    }
}
