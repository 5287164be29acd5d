use serde::Serialize;

use crate::domain::{OrderId, Price, ProductId, UserId};

/// One line of a placed order. `unit_price` is the checkout-time snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Price,
}

impl OrderLine {
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub username: String,
    pub total_amount: Price,
    pub payment_method: Option<String>,
    pub created_at: String,
    pub items: Vec<OrderLine>,
}

impl Order {
    /// `name (qty: N, price: P)` entries joined by `, `, as used by exports.
    #[must_use]
    pub fn product_summary(&self) -> String {
        if self.items.is_empty() {
            return "N/A".to_string();
        }

        self.items
            .iter()
            .map(|item| {
                format!(
                    "{} (qty: {}, price: {})",
                    item.product_name,
                    item.quantity,
                    item.unit_price.formatted()
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The calendar day (`YYYY-MM-DD`) the order was placed on.
    #[must_use]
    pub fn order_date(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }
}
