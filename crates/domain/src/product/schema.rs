use validation::{Field, Schema};

use crate::pagination::pagination_schema;

pub const SORTABLE: [&str; 7] = [
    "createdAt",
    "updatedAt",
    "name",
    "price",
    "stock",
    "category",
    "id",
];

pub fn create() -> Schema {
    Schema::new()
        .field(Field::string("name").min_length(3).max_length(100).required())
        .field(Field::string("description").min_length(10).required())
        .field(Field::number("price").positive().required())
        .field(Field::string("category").required())
        .field(Field::integer("stock").min(0.0).default(0))
        .field(Field::boolean("isActive").default(true))
}

pub fn update() -> Schema {
    Schema::new()
        .field(Field::string("name").min_length(3).max_length(100))
        .field(Field::string("description").min_length(10))
        .field(Field::number("price").positive())
        .field(Field::string("category"))
        .field(Field::integer("stock").min(0.0))
        .field(Field::boolean("isActive"))
}

pub fn list() -> Schema {
    pagination_schema(&SORTABLE)
}
