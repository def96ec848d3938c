//! Product service.

use common::{Product, ProductId};
use store::{Page, Store};

use crate::error::DomainError;

use super::{CreateProduct, ListProducts, UpdateProduct};

/// Service for managing products.
#[derive(Clone)]
pub struct ProductService<S: Store> {
    store: S,
}

impl<S: Store> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, query: ListProducts) -> Result<Page<Product>, DomainError> {
        Ok(self.store.find_all_products(&query.0).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, DomainError> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create(&self, cmd: CreateProduct) -> Result<Product, DomainError> {
        let product = self.store.create_product(cmd.into()).await?;
        metrics::counter!("products_created_total").increment(1);
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd))]
    pub async fn update(&self, id: ProductId, cmd: UpdateProduct) -> Result<Product, DomainError> {
        let product = self
            .store
            .update_product(id, cmd.into())
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        metrics::counter!("products_updated_total").increment(1);
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), DomainError> {
        if !self.store.delete_product(id).await? {
            return Err(DomainError::not_found("Product", id));
        }
        metrics::counter!("products_deleted_total").increment(1);
        Ok(())
    }
}
