//! Outbound shapes of the stored entities.
//!
//! Timestamps are rendered with millisecond precision and a `Z` suffix to
//! match envelope timestamps. Users never carry their password hash.

use chrono::{DateTime, Utc};
use common::{Priority, Product, ProductId, Role, Ticket, TicketId, TicketStatus, User, UserId};
use serde::Serialize;
use validation::format_date;

fn date(value: DateTime<Utc>) -> String {
    format_date(&value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub due_date: Option<String>,
    pub assignee_id: Option<UserId>,
    pub created_by: Option<UserId>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title,
            description: ticket.description,
            priority: ticket.priority,
            status: ticket.status,
            due_date: ticket.due_date.map(date),
            assignee_id: ticket.assignee_id,
            created_by: ticket.created_by,
            created_at: date(ticket.created_at),
            updated_at: date(ticket.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            stock: product.stock,
            is_active: product.is_active,
            created_at: date(product.created_at),
            updated_at: date(product.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at.map(date),
            created_at: date(user.created_at),
            updated_at: date(user.updated_at),
        }
    }
}
