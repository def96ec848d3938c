//! User commands, schemas and service.

mod commands;
pub mod schema;
mod service;

pub use commands::{CreateUser, ListUsers, Login, UpdateUser};
pub use service::UserService;
