use common::Role;
use validation::{Field, Schema};

use crate::pagination::pagination_schema;

pub const SORTABLE: [&str; 5] = ["createdAt", "updatedAt", "username", "email", "id"];

pub fn create() -> Schema {
    Schema::new()
        .field(Field::string("username").alphanum().min_length(3).max_length(30).required())
        .field(Field::string("email").email().required())
        .field(Field::string("password").min_length(8).required())
        .field(Field::string("fullName").max_length(100))
        .field(Field::string("role").one_of(&Role::ALL).default("user"))
}

pub fn update() -> Schema {
    Schema::new()
        .field(Field::string("username").alphanum().min_length(3).max_length(30))
        .field(Field::string("email").email())
        .field(Field::string("password").min_length(8))
        .field(Field::string("fullName").max_length(100))
        .field(Field::string("role").one_of(&Role::ALL))
}

pub fn login() -> Schema {
    Schema::new()
        .field(Field::string("email").email().required())
        .field(Field::string("password").required())
}

pub fn list() -> Schema {
    pagination_schema(&SORTABLE)
}
