//! Shared list-query schema.

use validation::{Field, Schema};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// `page`, `limit`, `sortBy` and `sortOrder` with their defaults.
///
/// `sortBy` is restricted to `sortable`, which should include `createdAt`
/// since that is the default.
pub fn pagination_schema(sortable: &[&str]) -> Schema {
    Schema::new()
        .field(
            Field::integer("page")
                .min(1.0)
                .max(f64::from(u32::MAX))
                .default(DEFAULT_PAGE),
        )
        .field(
            Field::integer("limit")
                .min(1.0)
                .max(MAX_LIMIT as f64)
                .default(DEFAULT_LIMIT),
        )
        .field(Field::string("sortBy").one_of(sortable).default("createdAt"))
        .field(Field::string("sortOrder").one_of(&["asc", "desc"]).default("desc"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use store::{PageRequest, SortOrder};

    use super::*;

    #[test]
    fn defaults_deserialize_into_page_request() {
        let value = pagination_schema(&["createdAt", "name"]).validate(&json!({})).unwrap();
        let page: PageRequest = serde_json::from_value(value.into()).unwrap();
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn limit_is_capped() {
        let errors = pagination_schema(&["createdAt"])
            .validate(&json!({ "limit": "500" }))
            .unwrap_err();
        assert!(errors.has_field("limit"));
    }

    #[test]
    fn page_beyond_u32_is_a_field_error() {
        let errors = pagination_schema(&["createdAt"])
            .validate(&json!({ "page": "5000000000" }))
            .unwrap_err();
        assert!(errors.has_field("page"));

        let value = pagination_schema(&["createdAt"])
            .validate(&json!({ "page": u32::MAX.to_string() }))
            .unwrap();
        let page: PageRequest = serde_json::from_value(value.into()).unwrap();
        assert_eq!(page.page, u32::MAX);
    }

    #[test]
    fn sort_by_is_whitelisted() {
        let schema = pagination_schema(&["createdAt", "price"]);
        let value = schema
            .validate(&json!({ "sortBy": "price", "sortOrder": "asc" }))
            .unwrap();
        let page: PageRequest = serde_json::from_value(value.into()).unwrap();
        assert_eq!(page.sort_by, "price");
        assert_eq!(page.sort_order, SortOrder::Asc);

        assert!(schema.validate(&json!({ "sortBy": "password" })).is_err());
    }
}
