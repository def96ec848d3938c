//! Property-style checks of the validation engine against realistic schemas.

use serde_json::{Value, json};
use validation::{Field, Schema, ValidateOptions, validate};

fn ticket_create() -> Schema {
    Schema::new()
        .field(Field::string("title").min_length(3).max_length(100).required())
        .field(Field::string("description").min_length(10).required())
        .field(Field::string("priority").one_of(&["low", "medium", "high"]).default("medium"))
        .field(
            Field::string("status")
                .one_of(&["open", "in_progress", "resolved", "closed"])
                .default("open"),
        )
        .field(Field::date("dueDate").not_before_now())
        .field(Field::integer("assigneeId").positive())
}

fn ticket_filter() -> Schema {
    Schema::new()
        .field(Field::string("status").one_of(&["open", "in_progress", "resolved", "closed"]))
        .field(Field::integer("assigneeId").positive())
        .field(Field::date("fromDate"))
        .field(Field::date("toDate").not_before("fromDate"))
        .field(Field::integer("page").min(1.0).default(1))
        .field(Field::integer("limit").min(1.0).max(100.0).default(10))
        .field(Field::string("sortOrder").one_of(&["asc", "desc"]).default("desc"))
}

mod normalization {
    use super::*;

    #[test]
    fn output_contains_only_declared_fields() {
        let schema = ticket_create();
        let payload = json!({
            "title": "Projector broken",
            "description": "The projector in room 4 shows no image",
            "assigneeId": 12,
            "createdBy": 99,
            "id": 5,
            "internal": { "secret": true }
        });

        let value = schema.validate(&payload).unwrap();
        for key in value.keys() {
            assert!(schema.contains(key), "unexpected key {key}");
        }
        for field in schema.fields().iter().filter(|f| f.is_required()) {
            assert!(value.contains_key(field.name()));
        }
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["status"], "open");
        assert_eq!(value["assigneeId"], 12);
        assert!(!value.contains_key("dueDate"));
    }

    #[test]
    fn empty_payload_with_optional_schema_gets_all_defaults() {
        let value = ticket_filter().validate(&json!({})).unwrap();
        assert_eq!(value.len(), 3);
        assert_eq!(value["page"], 1);
        assert_eq!(value["limit"], 10);
        assert_eq!(value["sortOrder"], "desc");
    }

    #[test]
    fn provided_values_override_defaults() {
        let value = ticket_filter()
            .validate(&json!({ "page": "3", "limit": 25, "sortOrder": "asc" }))
            .unwrap();
        assert_eq!(value["page"], 3);
        assert_eq!(value["limit"], 25);
        assert_eq!(value["sortOrder"], "asc");
    }
}

mod error_collection {
    use super::*;

    #[test]
    fn two_independent_violations_yield_two_errors() {
        let schema = Schema::new()
            .field(Field::string("title").min_length(3))
            .field(Field::string("priority").one_of(&["low", "medium", "high"]));

        let errors = schema
            .validate(&json!({ "title": "a", "priority": "urgent" }))
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors()[0].field, "title");
        assert_eq!(errors.errors()[1].field, "priority");
    }

    #[test]
    fn error_order_follows_schema_not_input() {
        let payload: Value = serde_json::from_str(
            r#"{ "assigneeId": 0, "status": "done", "description": "short", "title": "x" }"#,
        )
        .unwrap();

        let errors = ticket_create().validate(&payload).unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "description", "status", "assigneeId"]);
    }

    #[test]
    fn every_missing_required_field_is_reported() {
        let errors = ticket_create().validate(&json!({})).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("title"));
        assert!(errors.has_field("description"));
    }

    #[test]
    fn abort_early_option_is_honoured() {
        let options = ValidateOptions {
            abort_early: true,
            strip_unknown: true,
        };
        let errors = validate(&ticket_create(), &json!({ "title": 1 }), options).unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}

mod cross_field {
    use super::*;

    #[test]
    fn to_date_alone_does_not_trigger_reference_error() {
        let value = ticket_filter()
            .validate(&json!({ "toDate": "2020-01-01" }))
            .unwrap();
        assert_eq!(value["toDate"], "2020-01-01T00:00:00.000Z");
    }

    #[test]
    fn from_date_alone_is_accepted() {
        assert!(ticket_filter().validate(&json!({ "fromDate": "2020-01-01" })).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected_on_to_date() {
        let errors = ticket_filter()
            .validate(&json!({ "fromDate": "2020-02-01", "toDate": "2020-01-01" }))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "toDate");
    }

    #[test]
    fn reference_error_sits_among_other_errors_in_declaration_order() {
        let errors = ticket_filter()
            .validate(&json!({
                "limit": 1000,
                "toDate": "2020-01-01",
                "fromDate": "2020-02-01",
                "status": "nope"
            }))
            .unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["status", "toDate", "limit"]);
    }
}
