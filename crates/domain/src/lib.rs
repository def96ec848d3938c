//! Domain layer for the ticketing API.
//!
//! Each resource module provides:
//! - commands: the deserialized form of each inbound payload, with its
//!   validation schema attached through [`validation::HasSchema`]
//! - a service wrapping a [`store::Store`] with not-found handling,
//!   logging and metrics

pub mod error;
pub mod pagination;
pub mod product;
pub mod ticket;
pub mod user;

pub use error::DomainError;
pub use pagination::pagination_schema;
pub use product::{CreateProduct, ListProducts, ProductService, UpdateProduct};
pub use ticket::{
    AssignTicket, CreateTicket, ListTickets, ListUserTickets, TicketService, UpdateTicket,
};
pub use user::{CreateUser, ListUsers, Login, UpdateUser, UserService};
