//! Domain service for the per-user cart ledger.
//!
//! Every operation acts on the cart of the [`Principal`] it is handed.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Price, Principal, ProductId};
use crate::models::cart::{CartLine, cart_total};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage conflict: {0}")]
    StorageConflict(String),
}

impl From<sea_orm::DbErr> for CartError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

impl From<anyhow::Error> for CartError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

/// Cart lines plus their total at live prices.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub total_display: String,
}

impl CartSummary {
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        let total = cart_total(&lines);
        Self {
            lines,
            total,
            total_display: total.formatted(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[async_trait::async_trait]
pub trait CartService: Send + Sync {
    /// Adds `quantity` of a product, incrementing an existing entry.
    ///
    /// # Errors
    ///
    /// - [`CartError::Validation`] if `quantity` is below 1, or the entry
    ///   would exceed `i32::MAX`; the stored quantity is left unchanged
    /// - [`CartError::NotFound`] if the product does not exist
    async fn add(
        &self,
        principal: &Principal,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), CartError>;

    /// Overwrites the quantity of an entry; zero or less removes it. Does
    /// nothing when there is no entry. Returns the new cart total.
    async fn set_quantity(
        &self,
        principal: &Principal,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Price, CartError>;

    async fn remove(&self, principal: &Principal, product_id: ProductId) -> Result<(), CartError>;

    async fn total(&self, principal: &Principal) -> Result<Price, CartError>;

    async fn list(&self, principal: &Principal) -> Result<CartSummary, CartError>;
}
