//! Ticket entity and its write models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ParseEnumError, TicketId, UserId};

/// Urgency of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [&'static str; 3] = ["low", "medium", "high"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ParseEnumError {
                kind: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a ticket.
///
/// `Assigned` is only reached through assignment; clients cannot set it
/// directly through the create or update payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
    Assigned,
}

impl TicketStatus {
    /// Statuses accepted from client payloads.
    pub const SETTABLE: [&'static str; 4] = ["open", "in_progress", "resolved", "closed"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
            TicketStatus::Assigned => "assigned",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            "assigned" => Ok(TicketStatus::Assigned),
            other => Err(ParseEnumError {
                kind: "ticket status",
                value: other.to_string(),
            }),
        }
    }
}

/// A persisted support ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<UserId>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
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
    #[serde(default)]
    pub created_by: Option<UserId>,
}

impl NewTicket {
    /// Creates a ticket with default priority and status.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: Priority::default(),
            status: TicketStatus::default(),
            due_date: None,
            assignee_id: None,
            created_by: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }
}

/// Partial update of a ticket; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketChanges {
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

impl TicketChanges {
    /// Applies the present fields to an existing ticket.
    pub fn apply_to(self, ticket: &mut Ticket) {
        if let Some(title) = self.title {
            ticket.title = title;
        }
        if let Some(description) = self.description {
            ticket.description = description;
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
        if let Some(due_date) = self.due_date {
            ticket.due_date = Some(due_date);
        }
        if let Some(assignee_id) = self.assignee_id {
            ticket.assignee_id = Some(assignee_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for s in ["open", "in_progress", "resolved", "closed", "assigned"] {
            let status: TicketStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!("urgent".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn ticket_serializes_with_camel_case_keys() {
        let now = Utc::now();
        let ticket = Ticket {
            id: TicketId::new(1),
            title: "Printer jam".to_string(),
            description: "Second floor printer is jammed".to_string(),
            priority: Priority::High,
            status: TicketStatus::InProgress,
            due_date: None,
            assignee_id: Some(UserId::new(3)),
            created_by: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["assigneeId"], 3);
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["priority"], "high");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn new_ticket_defaults_from_json() {
        let ticket: NewTicket = serde_json::from_value(serde_json::json!({
            "title": "VPN down",
            "description": "Cannot reach the VPN gateway"
        }))
        .unwrap();
        assert_eq!(ticket.priority, Priority::Medium);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.created_by.is_none());
    }

    #[test]
    fn changes_only_touch_present_fields() {
        let now = Utc::now();
        let mut ticket = Ticket {
            id: TicketId::new(1),
            title: "Old".to_string(),
            description: "Old description".to_string(),
            priority: Priority::Low,
            status: TicketStatus::Open,
            due_date: None,
            assignee_id: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        };

        TicketChanges {
            title: Some("New".to_string()),
            status: Some(TicketStatus::Closed),
            ..Default::default()
        }
        .apply_to(&mut ticket);

        assert_eq!(ticket.title, "New");
        assert_eq!(ticket.status, TicketStatus::Closed);
        assert_eq!(ticket.description, "Old description");
        assert_eq!(ticket.priority, Priority::Low);
    }
}
