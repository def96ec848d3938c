//! Request validation for the ticketing API.
//!
//! Schemas are declared once per operation with the [`Field`] builder and
//! checked with [`validate`]. A pass never stops at the first problem: every
//! violated constraint is reported, unknown keys are stripped, and declared
//! defaults are filled in.
//!
//! ```
//! use serde_json::json;
//! use validation::{Field, Schema};
//!
//! let schema = Schema::new()
//!     .field(Field::string("title").min_length(3).required())
//!     .field(Field::string("priority").one_of(&["low", "medium", "high"]).default("medium"));
//!
//! let value = schema.validate(&json!({ "title": "Printer jam", "extra": 1 })).unwrap();
//! assert_eq!(value["priority"], "medium");
//! assert!(!value.contains_key("extra"));
//! ```

pub mod engine;
pub mod error;
pub mod schema;

pub use engine::{ValidateOptions, format_date, parse_iso_date, validate};
pub use error::{FieldError, ValidationErrors};
pub use schema::{DateBound, Field, FieldType, HasSchema, Rule, Schema};
