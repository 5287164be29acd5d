//! `SeaORM` implementation of the `CartService` trait.

use crate::db::Store;
use crate::domain::{Price, Principal, ProductId};
use crate::models::cart::cart_total;
use crate::services::cart_service::{CartError, CartService, CartSummary};
use async_trait::async_trait;
use tracing::debug;

pub struct SeaOrmCartService {
    store: Store,
}

impl SeaOrmCartService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn record_mutation(operation: &'static str) {
    metrics::counter!("cart_mutations_total", "operation" => operation).increment(1);
}

#[async_trait]
impl CartService for SeaOrmCartService {
    async fn add(
        &self,
        principal: &Principal,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::Validation(format!(
                "Quantity must be at least 1 (got {quantity})"
            )));
        }

        if self.store.get_product(product_id.value()).await?.is_none() {
            return Err(CartError::NotFound(product_id));
        }

        let added = self
            .store
            .add_to_cart(principal.user_id.value(), product_id.value(), quantity)
            .await?;
        if !added {
            return Err(CartError::Validation(format!(
                "Quantity in cart cannot exceed {}",
                i32::MAX
            )));
        }

        debug!(user_id = %principal.user_id, product_id = %product_id, quantity, "Added to cart");
        record_mutation("add");
        Ok(())
    }

    async fn set_quantity(
        &self,
        principal: &Principal,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Price, CartError> {
        if quantity <= 0 {
            self.remove(principal, product_id).await?;
        } else if self
            .store
            .set_cart_quantity(principal.user_id.value(), product_id.value(), quantity)
            .await?
        {
            record_mutation("set_quantity");
        }

        self.total(principal).await
    }

    async fn remove(&self, principal: &Principal, product_id: ProductId) -> Result<(), CartError> {
        let removed = self
            .store
            .remove_from_cart(principal.user_id.value(), product_id.value())
            .await?;

        if removed {
            record_mutation("remove");
        }
        Ok(())
    }

    async fn total(&self, principal: &Principal) -> Result<Price, CartError> {
        let lines = self.store.list_cart(principal.user_id.value()).await?;
        Ok(cart_total(&lines))
    }

    async fn list(&self, principal: &Principal) -> Result<CartSummary, CartError> {
        let lines = self.store.list_cart(principal.user_id.value()).await?;
        Ok(CartSummary::new(lines))
    }
}
