use async_trait::async_trait;
use common::{
    NewProduct, NewTicket, NewUser, Product, ProductChanges, ProductId, Ticket, TicketChanges,
    TicketId, User, UserChanges, UserId,
};

use crate::{Page, PageRequest, Result, TicketFilter};

/// Persistence for tickets.
///
/// Lookups of missing rows return `Ok(None)` (or `false` for deletes);
/// deciding whether that is an error is left to the caller.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Lists tickets matching `filter`, sorted and paginated by `page`.
    async fn find_all_tickets(&self, filter: &TicketFilter, page: &PageRequest) -> Result<Page<Ticket>>;

    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>>;

    /// Tickets assigned to a user, paginated like [`find_all_tickets`](Self::find_all_tickets).
    async fn find_tickets_by_assignee(&self, user_id: UserId, page: &PageRequest) -> Result<Page<Ticket>> {
        self.find_all_tickets(&TicketFilter::new().assignee(user_id), page).await
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket>;

    /// Applies the present fields and bumps `updated_at`.
    async fn update_ticket(&self, id: TicketId, changes: TicketChanges) -> Result<Option<Ticket>>;

    async fn delete_ticket(&self, id: TicketId) -> Result<bool>;

    /// Sets the assignee and moves the ticket to `assigned`.
    async fn assign_ticket(&self, id: TicketId, user_id: UserId) -> Result<Option<Ticket>>;

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<u64>;
}

/// Persistence for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all_products(&self, page: &PageRequest) -> Result<Page<Product>>;

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>>;

    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    async fn update_product(&self, id: ProductId, changes: ProductChanges) -> Result<Option<Product>>;

    async fn delete_product(&self, id: ProductId) -> Result<bool>;

    async fn count_products(&self) -> Result<u64>;
}

/// Persistence for users.
///
/// Username and email are unique; writes that would duplicate either
/// fail with [`StoreError::Conflict`](crate::StoreError::Conflict).
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all_users(&self, page: &PageRequest) -> Result<Page<User>>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<Option<User>>;

    async fn delete_user(&self, id: UserId) -> Result<bool>;

    async fn count_users(&self) -> Result<u64>;

    /// Stamps `last_login_at` with the current time.
    async fn record_login(&self, id: UserId) -> Result<Option<User>>;
}

/// Connectivity check against the backing store.
#[async_trait]
pub trait Ping: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// Everything the application needs from a backing store.
pub trait Store:
    TicketRepository + ProductRepository + UserRepository + Ping + Clone + 'static
{
}

impl<T> Store for T where
    T: TicketRepository + ProductRepository + UserRepository + Ping + Clone + 'static
{
}
