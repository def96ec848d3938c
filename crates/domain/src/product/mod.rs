//! Product commands, schemas and service.

mod commands;
pub mod schema;
mod service;

pub use commands::{CreateProduct, ListProducts, UpdateProduct};
pub use service::ProductService;
