//! Domain error types.

use store::StoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the repository layer.
    #[error("Store error: {0}")]
    Store(StoreError),

    /// The addressed entity does not exist.
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A unique value is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Login failed; deliberately does not say which half was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password hashing or verification failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// The blocking hashing task did not complete.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            conflict @ StoreError::Conflict { .. } => DomainError::Conflict(conflict.to_string()),
            other => DomainError::Store(other),
        }
    }
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        DomainError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use common::TicketId;

    use super::*;

    #[test]
    fn store_conflict_becomes_domain_conflict() {
        let err: DomainError = StoreError::Conflict {
            entity: "User",
            field: "email",
        }
        .into();
        assert!(matches!(err, DomainError::Conflict(ref m) if m == "User with this email already exists"));
    }

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = DomainError::not_found("Ticket", TicketId::new(9));
        assert_eq!(err.to_string(), "Ticket with ID 9 not found");
    }
}
