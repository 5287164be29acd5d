use serde::{Deserialize, Serialize};

use crate::domain::{OrderId, Price, ProductId, UserId};
use crate::models::order::{Order, OrderLine};
use crate::models::product::Product;
use crate::models::user::User;
use crate::services::{CartSummary, DailyRevenue, Dashboard, Suggestion};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Public URL of a stored image reference.
#[must_use]
pub fn image_url(reference: &str) -> String {
    format!("/images/{reference}")
}

/// Money as stored units, input units and display string.
#[derive(Debug, Serialize)]
pub struct MoneyDto {
    pub amount: i64,
    pub input: f64,
    pub display: String,
}

impl From<Price> for MoneyDto {
    fn from(price: Price) -> Self {
        Self {
            amount: price.stored(),
            input: price.as_input(),
            display: price.formatted(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: ProductId,
    pub name: String,
    pub price: MoneyDto,
    pub description: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub images: Vec<String>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price.into(),
            description: product.description,
            category: product.category,
            image_url: product.image_url.as_deref().map(image_url),
            images: product.images.iter().map(|i| image_url(i)).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionDto {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub image_url: Option<String>,
}

impl From<Suggestion> for SuggestionDto {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            id: suggestion.id,
            name: suggestion.name,
            price: suggestion.price_display,
            image_url: suggestion.image_url.as_deref().map(image_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartLineDto {
    pub product: ProductDto,
    pub quantity: i32,
    pub subtotal: MoneyDto,
}

#[derive(Debug, Serialize)]
pub struct CartDto {
    pub items: Vec<CartLineDto>,
    pub total: MoneyDto,
}

impl From<CartSummary> for CartDto {
    fn from(summary: CartSummary) -> Self {
        Self {
            items: summary
                .lines
                .into_iter()
                .map(|line| CartLineDto {
                    subtotal: line.subtotal().into(),
                    quantity: line.quantity,
                    product: line.product.into(),
                })
                .collect(),
            total: summary.total.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartTotalDto {
    pub total: MoneyDto,
}

#[derive(Debug, Serialize)]
pub struct OrderLineDto {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: MoneyDto,
    pub subtotal: MoneyDto,
}

impl From<OrderLine> for OrderLineDto {
    fn from(line: OrderLine) -> Self {
        Self {
            subtotal: line.subtotal().into(),
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            unit_price: line.unit_price.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: OrderId,
    pub user_id: UserId,
    pub username: String,
    pub total: MoneyDto,
    pub payment_method: Option<String>,
    pub created_at: String,
    pub items: Vec<OrderLineDto>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            username: order.username,
            total: order.total_amount.into(),
            payment_method: order.payment_method,
            created_at: order.created_at,
            items: order.items.into_iter().map(OrderLineDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailyRevenueDto {
    pub date: String,
    pub total: MoneyDto,
}

impl From<DailyRevenue> for DailyRevenueDto {
    fn from(day: DailyRevenue) -> Self {
        Self {
            date: day.date,
            total: day.total.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub total_revenue: MoneyDto,
    pub revenue_by_day: Vec<DailyRevenueDto>,
    pub orders: Vec<OrderDto>,
}

impl From<Dashboard> for DashboardDto {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            total_revenue: dashboard.total_revenue.into(),
            revenue_by_day: dashboard
                .revenue_by_day
                .into_iter()
                .map(DailyRevenueDto::from)
                .collect(),
            orders: dashboard.orders.into_iter().map(OrderDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
