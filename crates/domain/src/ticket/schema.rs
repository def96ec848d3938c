use common::{Priority, TicketStatus};
use validation::{Field, Schema};

use crate::pagination::pagination_schema;

pub const SORTABLE: [&str; 7] = [
    "createdAt",
    "updatedAt",
    "title",
    "priority",
    "status",
    "dueDate",
    "id",
];

pub fn create() -> Schema {
    Schema::new()
        .field(Field::string("title").min_length(3).max_length(100).required())
        .field(Field::string("description").min_length(10).required())
        .field(Field::string("priority").one_of(&Priority::ALL).default("medium"))
        .field(Field::string("status").one_of(&TicketStatus::SETTABLE).default("open"))
        .field(Field::date("dueDate").not_before_now())
        .field(Field::integer("assigneeId").positive())
}

pub fn update() -> Schema {
    Schema::new()
        .field(Field::string("title").min_length(3).max_length(100))
        .field(Field::string("description").min_length(10))
        .field(Field::string("priority").one_of(&Priority::ALL))
        .field(Field::string("status").one_of(&TicketStatus::SETTABLE))
        .field(Field::date("dueDate"))
        .field(Field::integer("assigneeId").positive())
}

pub fn assign() -> Schema {
    Schema::new().field(Field::integer("assigneeId").positive().required())
}

pub fn filter() -> Schema {
    Schema::new()
        .field(Field::string("status").one_of(&TicketStatus::SETTABLE))
        .field(Field::string("priority").one_of(&Priority::ALL))
        .field(Field::integer("assigneeId").positive())
        .field(Field::string("title"))
        .field(Field::date("fromDate"))
        .field(Field::date("toDate").not_before("fromDate"))
        .concat(pagination_schema(&SORTABLE))
}
