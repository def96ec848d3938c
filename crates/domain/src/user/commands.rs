//! User commands. Passwords arrive in plain text and are hashed by the service.

use std::fmt;
use std::sync::LazyLock;

use common::Role;
use serde::Deserialize;
use store::PageRequest;
use validation::{HasSchema, Schema};

use super::schema;

static CREATE: LazyLock<Schema> = LazyLock::new(schema::create);
static UPDATE: LazyLock<Schema> = LazyLock::new(schema::update);
static LOGIN: LazyLock<Schema> = LazyLock::new(schema::login);
static LIST: LazyLock<Schema> = LazyLock::new(schema::list);

const REDACTED: &str = "[redacted]";

/// Command to register a user.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .finish()
    }
}

impl HasSchema for CreateUser {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

/// Command to change some fields of a user.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .finish()
    }
}

impl HasSchema for UpdateUser {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// Credentials for `POST /users/login`.
#[derive(Clone, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

impl HasSchema for Login {
    fn schema() -> &'static Schema {
        &LOGIN
    }
}

/// Pagination for the user list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ListUsers(pub PageRequest);

impl HasSchema for ListUsers {
    fn schema() -> &'static Schema {
        &LIST
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn create_defaults_role() {
        let value = CreateUser::schema()
            .validate(&json!({
                "username": "alice42",
                "email": "alice@example.com",
                "password": "correct horse"
            }))
            .unwrap();
        let cmd: CreateUser = serde_json::from_value(Value::Object(value)).unwrap();
        assert_eq!(cmd.role, Role::User);
        assert!(cmd.full_name.is_none());
    }

    #[test]
    fn create_rejects_bad_username_and_email() {
        let errors = CreateUser::schema()
            .validate(&json!({
                "username": "al ice",
                "email": "not-an-email",
                "password": "short"
            }))
            .unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["username", "email", "password"]);
    }

    #[test]
    fn debug_output_hides_password() {
        let cmd = Login {
            email: "a@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        let rendered = format!("{cmd:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains(REDACTED));
    }
}
