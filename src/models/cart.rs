use serde::Serialize;

use crate::domain::Price;
use crate::models::product::Product;

/// A cart entry joined with the live product it points at.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
}

impl CartLine {
    /// Line total at the product's current price.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Sum of all line subtotals using live product prices.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::subtotal).sum()
}
