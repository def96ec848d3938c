use chrono::{DateTime, Utc};
use common::{Priority, Ticket, TicketStatus, UserId};
use serde::{Deserialize, Serialize};

/// Direction of a sorted listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

fn default_sort_by() -> String {
    "createdAt".to_string()
}

/// Pagination and sorting options for list queries.
///
/// `sort_by` uses the API field name (`createdAt`, `title`, ...); each
/// repository maps it onto a known column and falls back to `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    #[serde(default)]
    pub sort_order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            sort_by: default_sort_by(),
            sort_order: SortOrder::default(),
        }
    }
}

impl PageRequest {
    /// Creates a request for the given 1-based page.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            ..Default::default()
        }
    }

    /// Sorts by an API field name.
    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = field.into();
        self.sort_order = order;
        self
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total_items,
            page: request.page,
            limit: request.limit,
        }
    }

    /// `ceil(total_items / limit)`, or 0 when `limit` is 0.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total_items.div_ceil(u64::from(self.limit))
        }
    }

    /// Transforms every item, keeping the pagination data.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Criteria for listing tickets. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilter {
    #[serde(default)]
    pub status: Option<TicketStatus>,

    #[serde(default)]
    pub priority: Option<Priority>,

    #[serde(default)]
    pub assignee_id: Option<UserId>,

    /// Case-insensitive substring of the title.
    #[serde(default)]
    pub title: Option<String>,

    /// Tickets created at or after this instant.
    #[serde(default)]
    pub from_date: Option<DateTime<Utc>>,

    /// Tickets created at or before this instant.
    #[serde(default)]
    pub to_date: Option<DateTime<Utc>>,
}

impl TicketFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    pub fn title_contains(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn created_between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from_date = from;
        self.to_date = to;
        self
    }

    /// Returns true if `ticket` satisfies every present criterion.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(status) = self.status
            && ticket.status != status
        {
            return false;
        }
        if let Some(priority) = self.priority
            && ticket.priority != priority
        {
            return false;
        }
        if let Some(assignee) = self.assignee_id
            && ticket.assignee_id != Some(assignee)
        {
            return false;
        }
        if let Some(ref title) = self.title
            && !ticket.title.to_lowercase().contains(&title.to_lowercase())
        {
            return false;
        }
        if let Some(from) = self.from_date
            && ticket.created_at < from
        {
            return false;
        }
        if let Some(to) = self.to_date
            && ticket.created_at > to
        {
            return false;
        }
        true
    }
}
