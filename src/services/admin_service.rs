//! Domain service for the admin back-office.
//!
//! Every operation receives the caller's principal and rejects callers
//! without the privileged flag with [`AdminError::Forbidden`] before touching
//! storage. Deletes run as one transaction each, children before parents.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{OrderId, Price, Principal, ProductId, UserId};
use crate::models::order::Order;
use crate::models::product::Product;
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Administrator privileges required")]
    Forbidden,

    #[error("You cannot delete your own account")]
    SelfDeleteForbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage conflict: {0}")]
    StorageConflict(String),
}

impl From<sea_orm::DbErr> for AdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

impl AdminError {
    pub(crate) fn product_not_found(id: ProductId) -> Self {
        Self::NotFound(format!("Product {id}"))
    }
}

/// Product form as entered by an admin. `price` is in input units
/// (thousands) and is scaled on the way in.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRevenue {
    /// `YYYY-MM-DD`
    pub date: String,
    pub total: Price,
    pub total_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_revenue: Price,
    pub total_revenue_display: String,
    pub revenue_by_day: Vec<DailyRevenue>,
    pub orders: Vec<Order>,
}

#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    async fn dashboard(&self, principal: Option<&Principal>) -> Result<Dashboard, AdminError>;

    async fn list_products(&self, principal: Option<&Principal>)
    -> Result<Vec<Product>, AdminError>;

    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for an empty name, a negative or
    /// non-numeric price, or a category outside the configured list.
    async fn create_product(
        &self,
        principal: Option<&Principal>,
        form: ProductForm,
    ) -> Result<Product, AdminError>;

    async fn update_product(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
        form: ProductForm,
    ) -> Result<Product, AdminError>;

    /// Stores a new primary image and removes the file it replaces.
    async fn set_primary_image(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Product, AdminError>;

    /// Attaches one more secondary image, up to the configured maximum.
    async fn add_secondary_image(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Product, AdminError>;

    /// Drops every secondary image row and file of a product.
    async fn clear_secondary_images(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
    ) -> Result<Product, AdminError>;

    /// Deletes a product with its order line items, cart entries and image
    /// rows in one transaction, then removes its image files.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] if the product does not exist.
    async fn delete_product(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
    ) -> Result<(), AdminError>;

    async fn list_orders(&self, principal: Option<&Principal>) -> Result<Vec<Order>, AdminError>;

    async fn delete_order(&self, principal: Option<&Principal>, id: OrderId)
    -> Result<(), AdminError>;

    /// All orders as CSV.
    async fn export_orders(&self, principal: Option<&Principal>) -> Result<String, AdminError>;

    async fn list_users(&self, principal: Option<&Principal>) -> Result<Vec<User>, AdminError>;

    /// # Errors
    ///
    /// Returns [`AdminError::DuplicateEmail`] if another user owns the email.
    async fn update_user(
        &self,
        principal: Option<&Principal>,
        id: UserId,
        form: UserForm,
    ) -> Result<User, AdminError>;

    /// Deletes a user with their cart entries and orders.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::SelfDeleteForbidden`] when `id` is the caller.
    async fn delete_user(&self, principal: Option<&Principal>, id: UserId)
    -> Result<(), AdminError>;
}

/// Fails with [`AdminError::Forbidden`] unless the caller is privileged.
pub fn require_admin(principal: Option<&Principal>) -> Result<&Principal, AdminError> {
    match principal {
        Some(p) if p.is_admin() => Ok(p),
        _ => Err(AdminError::Forbidden),
    }
}
