//! Repository layer for tickets, products and users.
//!
//! [`PostgresStore`] is the production backend; [`InMemoryStore`] backs the
//! test suites and local runs without `DATABASE_URL`. Both implement the
//! same [`Store`] contract.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{Page, PageRequest, SortOrder, TicketFilter};
pub use repository::{Ping, ProductRepository, Store, TicketRepository, UserRepository};
