//! Route handlers, one module per resource.

pub mod fallback;
pub mod health;
pub mod metrics;
pub mod products;
pub mod tickets;
pub mod users;
