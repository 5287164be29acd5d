//! `SeaORM` implementation of the `CatalogService` trait.

use crate::db::Store;
use crate::domain::ProductId;
use crate::models::product::Product;
use crate::services::catalog_service::{CatalogError, CatalogService, Suggestion};
use async_trait::async_trait;

pub struct SeaOrmCatalogService {
    store: Store,
    suggestion_limit: u64,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store, suggestion_limit: u64) -> Self {
        Self {
            store,
            suggestion_limit,
        }
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list_products().await?)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.store
            .get_product(id.value())
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list_products_by_category(category).await?)
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_products().await;
        }

        Ok(self.store.search_products(query, None).await?)
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<Suggestion>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let products = self
            .store
            .search_products(query, Some(self.suggestion_limit))
            .await?;

        Ok(products.into_iter().map(Suggestion::from).collect())
    }
}
