//! Product commands.

use std::sync::LazyLock;

use common::{NewProduct, ProductChanges};
use serde::Deserialize;
use store::PageRequest;
use validation::{HasSchema, Schema};

use super::schema;

static CREATE: LazyLock<Schema> = LazyLock::new(schema::create);
static UPDATE: LazyLock<Schema> = LazyLock::new(schema::update);
static LIST: LazyLock<Schema> = LazyLock::new(schema::list);

/// Command to add a product to the catalogue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<CreateProduct> for NewProduct {
    fn from(cmd: CreateProduct) -> Self {
        NewProduct {
            name: cmd.name,
            description: cmd.description,
            price: cmd.price,
            category: cmd.category,
            stock: cmd.stock,
            is_active: cmd.is_active,
        }
    }
}

impl HasSchema for CreateProduct {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

/// Command to change some fields of a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<UpdateProduct> for ProductChanges {
    fn from(cmd: UpdateProduct) -> Self {
        ProductChanges {
            name: cmd.name,
            description: cmd.description,
            price: cmd.price,
            category: cmd.category,
            stock: cmd.stock,
            is_active: cmd.is_active,
        }
    }
}

impl HasSchema for UpdateProduct {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// Pagination for the product list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ListProducts(pub PageRequest);

impl HasSchema for ListProducts {
    fn schema() -> &'static Schema {
        &LIST
    }
}
