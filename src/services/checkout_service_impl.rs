//! `SeaORM` implementation of the `CheckoutService` trait.

use crate::db::Store;
use crate::domain::{OrderId, Principal};
use crate::models::order::Order;
use crate::services::cart_service::CartSummary;
use crate::services::checkout_service::{CheckoutError, CheckoutService};
use async_trait::async_trait;
use tracing::info;

const MAX_PAYMENT_LABEL_LEN: usize = 64;

pub struct SeaOrmCheckoutService {
    store: Store,
}

impl SeaOrmCheckoutService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CheckoutService for SeaOrmCheckoutService {
    async fn checkout_summary(&self, principal: &Principal) -> Result<CartSummary, CheckoutError> {
        let lines = self.store.list_cart(principal.user_id.value()).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(CartSummary::new(lines))
    }

    async fn checkout(
        &self,
        principal: &Principal,
        payment_method: &str,
    ) -> Result<Order, CheckoutError> {
        let payment_method = payment_method.trim();
        if payment_method.chars().count() > MAX_PAYMENT_LABEL_LEN {
            return Err(CheckoutError::Validation(format!(
                "Payment method must be at most {MAX_PAYMENT_LABEL_LEN} characters"
            )));
        }
        let label = (!payment_method.is_empty()).then(|| payment_method.to_string());

        let order = self
            .store
            .place_order(principal.user_id.value(), label)
            .await?
            .ok_or(CheckoutError::EmptyCart)?;

        metrics::counter!("orders_placed_total").increment(1);
        info!(
            order_id = %order.id,
            user_id = %principal.user_id,
            total = %order.total_amount,
            items = order.items.len(),
            "Checkout complete"
        );

        Ok(order)
    }

    async fn order_history(&self, principal: &Principal) -> Result<Vec<Order>, CheckoutError> {
        Ok(self
            .store
            .list_orders_for_user(principal.user_id.value())
            .await?)
    }

    async fn get_order(&self, principal: &Principal, id: OrderId) -> Result<Order, CheckoutError> {
        self.store
            .get_order(id.value())
            .await?
            .filter(|order| order.user_id == principal.user_id)
            .ok_or(CheckoutError::NotFound(id))
    }
}
