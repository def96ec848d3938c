//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{
    NewProduct, NewTicket, NewUser, Priority, ProductChanges, Role, TicketChanges, TicketId,
    TicketStatus, UserChanges,
};
use sqlx::PgPool;
use store::{
    Ping, PageRequest, PostgresStore, ProductRepository, SortOrder, StoreError, TicketFilter,
    TicketRepository, UserRepository,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/001_create_tables.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Fresh pool and empty tables for each test
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE tickets, products, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$not-a-real-hash".to_string(),
        full_name: Some("Test User".to_string()),
        role: Role::User,
    }
}

#[tokio::test]
async fn ping_succeeds() {
    let store = get_test_store().await;
    assert!(store.ping().await.is_ok());
}

#[tokio::test]
async fn create_and_find_ticket() {
    let store = get_test_store().await;

    let created = store
        .create_ticket(NewTicket::new("Broken chair", "The chair in room 12 wobbles").with_priority(Priority::Low))
        .await
        .unwrap();
    assert_eq!(created.id, TicketId::new(1));
    assert_eq!(created.status, TicketStatus::Open);

    let found = store.find_ticket(created.id).await.unwrap().unwrap();
    assert_eq!(found.title, "Broken chair");
    assert_eq!(found.priority, Priority::Low);

    assert!(store.find_ticket(TicketId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn list_tickets_with_filter_sort_and_pages() {
    let store = get_test_store().await;
    for i in 0..12 {
        let priority = if i % 3 == 0 { Priority::High } else { Priority::Medium };
        store
            .create_ticket(NewTicket::new(format!("Outage {i:02}"), "Service is unreachable").with_priority(priority))
            .await
            .unwrap();
    }
    store
        .create_ticket(NewTicket::new("Printer", "Out of paper again"))
        .await
        .unwrap();

    let filter = TicketFilter::new().title_contains("outage");
    let request = PageRequest::new(2, 5).sorted_by("title", SortOrder::Asc);
    let page = store.find_all_tickets(&filter, &request).await.unwrap();

    assert_eq!(page.total_items, 12);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.items[0].title, "Outage 05");

    let high = TicketFilter::new().priority(Priority::High);
    assert_eq!(store.count_tickets(&high).await.unwrap(), 4);
}

#[tokio::test]
async fn update_and_assign_ticket() {
    let store = get_test_store().await;
    let user = store.create_user(new_user("alice", "alice@example.com")).await.unwrap();
    let ticket = store
        .create_ticket(NewTicket::new("Laptop", "Laptop does not boot"))
        .await
        .unwrap();

    let updated = store
        .update_ticket(
            ticket.id,
            TicketChanges {
                description: Some("Laptop does not boot after update".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Laptop");
    assert_eq!(updated.description, "Laptop does not boot after update");

    let assigned = store.assign_ticket(ticket.id, user.id).await.unwrap().unwrap();
    assert_eq!(assigned.assignee_id, Some(user.id));
    assert_eq!(assigned.status, TicketStatus::Assigned);

    let mine = store
        .find_tickets_by_assignee(user.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(mine.total_items, 1);

    assert!(store.delete_ticket(ticket.id).await.unwrap());
    assert!(!store.delete_ticket(ticket.id).await.unwrap());
}

#[tokio::test]
async fn product_crud() {
    let store = get_test_store().await;

    let product = store
        .create_product(NewProduct::new("Headset", "Noise cancelling headset", 129.99, "audio").with_stock(4))
        .await
        .unwrap();
    assert!(product.is_active);

    let updated = store
        .update_product(
            product.id,
            ProductChanges {
                stock: Some(0),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.stock, 0);
    assert!(!updated.is_active);
    assert_eq!(updated.price, 129.99);

    let page = store.find_all_products(&PageRequest::default()).await.unwrap();
    assert_eq!(page.total_items, 1);

    assert!(store.delete_product(product.id).await.unwrap());
    assert_eq!(store.count_products().await.unwrap(), 0);
}

#[tokio::test]
async fn user_uniqueness_maps_to_conflict() {
    let store = get_test_store().await;
    let alice = store.create_user(new_user("alice", "alice@example.com")).await.unwrap();

    let err = store
        .create_user(new_user("alice", "someone@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { field: "username", .. }));

    let err = store
        .create_user(new_user("bob", "Alice@Example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { field: "email", .. }));

    let bob = store.create_user(new_user("bob", "bob@example.com")).await.unwrap();
    let err = store
        .update_user(
            bob.id,
            UserChanges {
                email: Some(alice.email.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
}

#[tokio::test]
async fn user_lookup_and_login_stamp() {
    let store = get_test_store().await;
    let user = store.create_user(new_user("carol", "carol@example.com")).await.unwrap();
    assert_eq!(user.role, Role::User);
    assert!(user.last_login_at.is_none());

    let by_email = store.find_user_by_email("CAROL@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
    let by_name = store.find_user_by_username("carol").await.unwrap().unwrap();
    assert_eq!(by_name.password_hash, user.password_hash);

    let logged_in = store.record_login(user.id).await.unwrap().unwrap();
    assert!(logged_in.last_login_at.is_some());

    assert_eq!(store.count_users().await.unwrap(), 1);
    assert!(store.delete_user(user.id).await.unwrap());
}
