//! Ticket commands.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use common::{NewTicket, Priority, TicketChanges, TicketStatus, UserId};
use serde::Deserialize;
use store::{PageRequest, SortOrder, TicketFilter};
use validation::{HasSchema, Schema};

use super::schema;

static CREATE: LazyLock<Schema> = LazyLock::new(schema::create);
static UPDATE: LazyLock<Schema> = LazyLock::new(schema::update);
static ASSIGN: LazyLock<Schema> = LazyLock::new(schema::assign);
static FILTER: LazyLock<Schema> = LazyLock::new(schema::filter);

/// Command to open a ticket.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
}

impl CreateTicket {
    /// Builds the insert model, recording who opened the ticket.
    pub fn into_new_ticket(self, created_by: Option<UserId>) -> NewTicket {
        NewTicket {
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            due_date: self.due_date,
            assignee_id: self.assignee_id,
            created_by,
        }
    }
}

impl HasSchema for CreateTicket {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

/// Command to change some fields of a ticket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicket {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
}

impl From<UpdateTicket> for TicketChanges {
    fn from(cmd: UpdateTicket) -> Self {
        TicketChanges {
            title: cmd.title,
            description: cmd.description,
            priority: cmd.priority,
            status: cmd.status,
            due_date: cmd.due_date,
            assignee_id: cmd.assignee_id,
        }
    }
}

impl HasSchema for UpdateTicket {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// Command to hand a ticket to a user.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTicket {
    pub assignee_id: UserId,
}

impl HasSchema for AssignTicket {
    fn schema() -> &'static Schema {
        &ASSIGN
    }
}

/// Query for the ticket list: filter criteria plus pagination.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTickets {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub from_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to_date: Option<DateTime<Utc>>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl ListTickets {
    pub fn filter(&self) -> TicketFilter {
        TicketFilter {
            status: self.status,
            priority: self.priority,
            assignee_id: self.assignee_id,
            title: self.title.clone(),
            from_date: self.from_date,
            to_date: self.to_date,
        }
    }

    pub fn page(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
        }
    }
}

impl Default for ListTickets {
    fn default() -> Self {
        let page = PageRequest::default();
        Self {
            status: None,
            priority: None,
            assignee_id: None,
            title: None,
            from_date: None,
            to_date: None,
            page: page.page,
            limit: page.limit,
            sort_by: page.sort_by,
            sort_order: page.sort_order,
        }
    }
}

impl HasSchema for ListTickets {
    fn schema() -> &'static Schema {
        &FILTER
    }
}

/// Pagination for the tickets of one user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ListUserTickets(pub PageRequest);

impl HasSchema for ListUserTickets {
    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> =
            LazyLock::new(|| crate::pagination::pagination_schema(&schema::SORTABLE));
        &SCHEMA
    }
}
