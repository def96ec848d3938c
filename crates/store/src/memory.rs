use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{
    NewProduct, NewTicket, NewUser, Product, ProductChanges, ProductId, Ticket, TicketChanges,
    TicketId, TicketStatus, User, UserChanges, UserId,
};
use tokio::sync::RwLock;

use crate::{
    Page, PageRequest, Result, SortOrder, StoreError, TicketFilter,
    repository::{Ping, ProductRepository, TicketRepository, UserRepository},
};

#[derive(Default)]
struct State {
    tickets: BTreeMap<TicketId, Ticket>,
    products: BTreeMap<ProductId, Product>,
    users: BTreeMap<UserId, User>,
    next_ticket: i64,
    next_product: i64,
    next_user: i64,
}

impl State {
    fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.username == username)
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }
}

/// In-memory store used for tests and for running without a database.
///
/// Mirrors the PostgreSQL implementation, including unique username and
/// email checks and the sort column whitelist.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every table and resets id sequences.
    pub async fn clear(&self) {
        *self.state.write().await = State::default();
    }
}

fn paginate<T>(mut items: Vec<T>, page: &PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let items = if offset >= items.len() {
        Vec::new()
    } else {
        items.drain(offset..).take(page.limit as usize).collect()
    };
    Page::new(items, total, page)
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn compare_tickets(a: &Ticket, b: &Ticket, sort_by: &str) -> Ordering {
    match sort_by {
        "title" => a.title.cmp(&b.title),
        "priority" => a.priority.cmp(&b.priority),
        "status" => a.status.as_str().cmp(b.status.as_str()),
        "dueDate" => a.due_date.cmp(&b.due_date),
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        "id" => a.id.cmp(&b.id),
        _ => a.created_at.cmp(&b.created_at),
    }
    .then(a.id.cmp(&b.id))
}

fn compare_products(a: &Product, b: &Product, sort_by: &str) -> Ordering {
    match sort_by {
        "name" => a.name.cmp(&b.name),
        "price" => a.price.total_cmp(&b.price),
        "stock" => a.stock.cmp(&b.stock),
        "category" => a.category.cmp(&b.category),
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        "id" => a.id.cmp(&b.id),
        _ => a.created_at.cmp(&b.created_at),
    }
    .then(a.id.cmp(&b.id))
}

fn compare_users(a: &User, b: &User, sort_by: &str) -> Ordering {
    match sort_by {
        "username" => a.username.cmp(&b.username),
        "email" => a.email.cmp(&b.email),
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        "id" => a.id.cmp(&b.id),
        _ => a.created_at.cmp(&b.created_at),
    }
    .then(a.id.cmp(&b.id))
}

#[async_trait]
impl TicketRepository for InMemoryStore {
    async fn find_all_tickets(&self, filter: &TicketFilter, page: &PageRequest) -> Result<Page<Ticket>> {
        let state = self.state.read().await;
        let mut tickets: Vec<_> = state
            .tickets
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| directed(compare_tickets(a, b, &page.sort_by), page.sort_order));
        Ok(paginate(tickets, page))
    }

    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        Ok(self.state.read().await.tickets.get(&id).cloned())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let mut state = self.state.write().await;
        state.next_ticket += 1;
        let now = Utc::now();
        let created = Ticket {
            id: TicketId::new(state.next_ticket),
            title: ticket.title,
            description: ticket.description,
            priority: ticket.priority,
            status: ticket.status,
            due_date: ticket.due_date,
            assignee_id: ticket.assignee_id,
            created_by: ticket.created_by,
            created_at: now,
            updated_at: now,
        };
        state.tickets.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_ticket(&self, id: TicketId, changes: TicketChanges) -> Result<Option<Ticket>> {
        let mut state = self.state.write().await;
        let Some(ticket) = state.tickets.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(ticket);
        ticket.updated_at = Utc::now();
        Ok(Some(ticket.clone()))
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool> {
        Ok(self.state.write().await.tickets.remove(&id).is_some())
    }

    async fn assign_ticket(&self, id: TicketId, user_id: UserId) -> Result<Option<Ticket>> {
        let mut state = self.state.write().await;
        let Some(ticket) = state.tickets.get_mut(&id) else {
            return Ok(None);
        };
        ticket.assignee_id = Some(user_id);
        ticket.status = TicketStatus::Assigned;
        ticket.updated_at = Utc::now();
        Ok(Some(ticket.clone()))
    }

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.tickets.values().filter(|t| filter.matches(t)).count() as u64)
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn find_all_products(&self, page: &PageRequest) -> Result<Page<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by(|a, b| directed(compare_products(a, b, &page.sort_by), page.sort_order));
        Ok(paginate(products, page))
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut state = self.state.write().await;
        state.next_product += 1;
        let now = Utc::now();
        let created = Product {
            id: ProductId::new(state.next_product),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            stock: product.stock,
            is_active: product.is_active,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_product(&self, id: ProductId, changes: ProductChanges) -> Result<Option<Product>> {
        let mut state = self.state.write().await;
        let Some(product) = state.products.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(product);
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        Ok(self.state.write().await.products.remove(&id).is_some())
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(self.state.read().await.products.len() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_all_users(&self, page: &PageRequest) -> Result<Page<User>> {
        let state = self.state.read().await;
        let mut users: Vec<_> = state.users.values().cloned().collect();
        users.sort_by(|a, b| directed(compare_users(a, b, &page.sort_by), page.sort_order));
        Ok(paginate(users, page))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        if state.username_taken(&user.username, None) {
            return Err(StoreError::Conflict {
                entity: "User",
                field: "username",
            });
        }
        if state.email_taken(&user.email, None) {
            return Err(StoreError::Conflict {
                entity: "User",
                field: "email",
            });
        }

        state.next_user += 1;
        let now = Utc::now();
        let created = User {
            id: UserId::new(state.next_user),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            role: user.role,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(ref username) = changes.username
            && state.username_taken(username, Some(id))
        {
            return Err(StoreError::Conflict {
                entity: "User",
                field: "username",
            });
        }
        if let Some(ref email) = changes.email
            && state.email_taken(email, Some(id))
        {
            return Err(StoreError::Conflict {
                entity: "User",
                field: "email",
            });
        }

        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(user);
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        // ON DELETE SET NULL
        for ticket in state.tickets.values_mut() {
            if ticket.assignee_id == Some(id) {
                ticket.assignee_id = None;
            }
            if ticket.created_by == Some(id) {
                ticket.created_by = None;
            }
        }
        Ok(true)
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.state.read().await.users.len() as u64)
    }

    async fn record_login(&self, id: UserId) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        user.last_login_at = Some(now);
        user.updated_at = now;
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl Ping for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::{Priority, Role};

    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
            role: Role::User,
        }
    }

    async fn seed_tickets(store: &InMemoryStore, count: usize) {
        for i in 0..count {
            store
                .create_ticket(NewTicket::new(
                    format!("Ticket {i:02}"),
                    "Something is broken somewhere",
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryStore::new();

        let first = store
            .create_ticket(NewTicket::new("First", "The first ticket body"))
            .await
            .unwrap();
        let second = store
            .create_ticket(NewTicket::new("Second", "The second ticket body"))
            .await
            .unwrap();

        assert_eq!(first.id, TicketId::new(1));
        assert_eq!(second.id, TicketId::new(2));
        assert_eq!(first.status, TicketStatus::Open);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn find_all_paginates() {
        let store = InMemoryStore::new();
        seed_tickets(&store, 25).await;

        let request = PageRequest::new(3, 10).sorted_by("title", SortOrder::Asc);
        let page = store
            .find_all_tickets(&TicketFilter::new(), &request)
            .await
            .unwrap();

        assert_eq!(page.total_items, 25);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].title, "Ticket 20");
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let store = InMemoryStore::new();
        seed_tickets(&store, 3).await;

        let page = store
            .find_all_tickets(&TicketFilter::new(), &PageRequest::new(5, 10))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 3);
    }

    #[tokio::test]
    async fn unknown_sort_field_falls_back_to_created_at() {
        let store = InMemoryStore::new();
        seed_tickets(&store, 3).await;

        let request = PageRequest::new(1, 10).sorted_by("password", SortOrder::Desc);
        let page = store
            .find_all_tickets(&TicketFilter::new(), &request)
            .await
            .unwrap();

        let ids: Vec<_> = page.items.iter().map(|t| t.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn filter_narrows_results_and_count() {
        let store = InMemoryStore::new();
        store
            .create_ticket(NewTicket::new("Disk full", "Server disk is at 100%").with_priority(Priority::High))
            .await
            .unwrap();
        store
            .create_ticket(NewTicket::new("Mouse", "Mouse wheel is squeaky"))
            .await
            .unwrap();

        let filter = TicketFilter::new().priority(Priority::High);
        let page = store
            .find_all_tickets(&filter, &PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Disk full");
        assert_eq!(store.count_tickets(&filter).await.unwrap(), 1);
        assert_eq!(store.count_tickets(&TicketFilter::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let store = InMemoryStore::new();
        let ticket = store
            .create_ticket(NewTicket::new("Original", "Original description"))
            .await
            .unwrap();

        let updated = store
            .update_ticket(
                ticket.id,
                TicketChanges {
                    status: Some(TicketStatus::Resolved),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Original");
        assert_eq!(updated.status, TicketStatus::Resolved);
        assert!(updated.updated_at >= ticket.updated_at);
    }

    #[tokio::test]
    async fn missing_rows_are_none_not_errors() {
        let store = InMemoryStore::new();
        let id = TicketId::new(42);

        assert!(store.find_ticket(id).await.unwrap().is_none());
        assert!(store.update_ticket(id, TicketChanges::default()).await.unwrap().is_none());
        assert!(store.assign_ticket(id, UserId::new(1)).await.unwrap().is_none());
        assert!(!store.delete_ticket(id).await.unwrap());
    }

    #[tokio::test]
    async fn assign_sets_assignee_and_status() {
        let store = InMemoryStore::new();
        let ticket = store
            .create_ticket(NewTicket::new("Assign me", "Needs an owner quickly"))
            .await
            .unwrap();

        let assigned = store
            .assign_ticket(ticket.id, UserId::new(7))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assigned.assignee_id, Some(UserId::new(7)));
        assert_eq!(assigned.status, TicketStatus::Assigned);

        let page = PageRequest::default();
        let mine = store.find_tickets_by_assignee(UserId::new(7), &page).await.unwrap();
        assert_eq!(mine.total_items, 1);
        assert!(
            store
                .find_tickets_by_assignee(UserId::new(8), &page)
                .await
                .unwrap()
                .items
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store = InMemoryStore::new();
        let product = store
            .create_product(NewProduct::new("Keyboard", "Mechanical keyboard", 89.5, "peripherals"))
            .await
            .unwrap();

        assert!(store.delete_product(product.id).await.unwrap());
        assert!(store.find_product(product.id).await.unwrap().is_none());
        assert_eq!(store.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn products_sort_by_price() {
        let store = InMemoryStore::new();
        for (name, price) in [("Cable", 5.0), ("Monitor", 199.0), ("Dock", 120.0)] {
            store
                .create_product(NewProduct::new(name, "Office equipment", price, "hardware"))
                .await
                .unwrap();
        }

        let request = PageRequest::new(1, 10).sorted_by("price", SortOrder::Desc);
        let page = store.find_all_products(&request).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Monitor", "Dock", "Cable"]);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let store = InMemoryStore::new();
        store.create_user(new_user("alice", "alice@example.com")).await.unwrap();

        let err = store
            .create_user(new_user("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "username", .. }));

        let err = store
            .create_user(new_user("bob", "ALICE@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "email", .. }));
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_user_checks_uniqueness_against_others_only() {
        let store = InMemoryStore::new();
        let alice = store.create_user(new_user("alice", "alice@example.com")).await.unwrap();
        store.create_user(new_user("bob", "bob@example.com")).await.unwrap();

        let same = store
            .update_user(
                alice.id,
                UserChanges {
                    email: Some("alice@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(same.is_some());

        let err = store
            .update_user(
                alice.id,
                UserChanges {
                    username: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn record_login_stamps_timestamp() {
        let store = InMemoryStore::new();
        let user = store.create_user(new_user("carol", "carol@example.com")).await.unwrap();
        assert!(user.last_login_at.is_none());

        let logged_in = store.record_login(user.id).await.unwrap().unwrap();
        assert!(logged_in.last_login_at.is_some());

        let found = store.find_user_by_email("Carol@Example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_user_by_username("dave").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_resets_sequences() {
        let store = InMemoryStore::new();
        seed_tickets(&store, 2).await;
        store.clear().await;

        let ticket = store
            .create_ticket(NewTicket::new("Fresh", "After the reset"))
            .await
            .unwrap();
        assert_eq!(ticket.id, TicketId::new(1));
    }
}
