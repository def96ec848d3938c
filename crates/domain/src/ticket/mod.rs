//! Ticket commands, schemas and service.

mod commands;
pub mod schema;
mod service;

pub use commands::{AssignTicket, CreateTicket, ListTickets, ListUserTickets, UpdateTicket};
pub use service::TicketService;
