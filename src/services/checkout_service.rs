//! Domain service that turns a cart into an order.

use thiserror::Error;

use crate::domain::{OrderId, Principal};
use crate::models::order::Order;
use crate::services::cart_service::CartSummary;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Order {0} not found")]
    NotFound(OrderId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage conflict: {0}")]
    StorageConflict(String),
}

impl From<sea_orm::DbErr> for CheckoutError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

impl From<anyhow::Error> for CheckoutError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait CheckoutService: Send + Sync {
    /// The pre-checkout view of the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when there is nothing to order.
    async fn checkout_summary(&self, principal: &Principal) -> Result<CartSummary, CheckoutError>;

    /// Places an order from the whole cart in a single transaction.
    ///
    /// Line items snapshot the live product price; the cart is emptied.
    /// `payment_method` is stored as a label and never processed.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if the cart has no entries; nothing is written
    /// - [`CheckoutError::StorageConflict`] if the transaction fails; nothing is written
    async fn checkout(
        &self,
        principal: &Principal,
        payment_method: &str,
    ) -> Result<Order, CheckoutError>;

    /// The caller's own orders, newest first.
    async fn order_history(&self, principal: &Principal) -> Result<Vec<Order>, CheckoutError>;

    /// One of the caller's own orders.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotFound`] if the order does not exist or
    /// belongs to someone else.
    async fn get_order(&self, principal: &Principal, id: OrderId) -> Result<Order, CheckoutError>;
}
