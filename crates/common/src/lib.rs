//! Shared types for the ticketing API.
//!
//! Entities (tickets, products, users), their insert/update write models and
//! the typed integer identifiers used across every crate.

pub mod product;
pub mod ticket;
pub mod types;
pub mod user;

pub use product::{NewProduct, Product, ProductChanges};
pub use ticket::{NewTicket, Priority, Ticket, TicketChanges, TicketStatus};
pub use types::{ParseEnumError, ParseIdError, ProductId, TicketId, UserId};
pub use user::{NewUser, Role, User, UserChanges};
