//! Domain service for read-only catalog browsing.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Price, ProductId};
use crate::models::product::Product;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Storage conflict: {0}")]
    StorageConflict(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

/// Compact product entry for search-as-you-type.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub price_display: String,
    pub image_url: Option<String>,
}

impl From<Product> for Suggestion {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price_display: product.price.formatted(),
            price: product.price,
            image_url: product.image_url,
        }
    }
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Product detail including secondary images.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product does not exist.
    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError>;

    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, CatalogError>;

    /// Case-insensitive substring search on the name. An empty query lists
    /// every product.
    async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError>;

    /// At most the configured number of matches. An empty query yields none.
    async fn suggestions(&self, query: &str) -> Result<Vec<Suggestion>, CatalogError>;
}
