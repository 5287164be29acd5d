//! `SeaORM` implementation of the `AdminService` trait.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::db::{SecondaryImageOutcome, Store, UniqueField, unique_violation};
use crate::domain::{OrderId, Price, Principal, ProductId, UserId};
use crate::models::order::Order;
use crate::models::product::{Product, ProductInput};
use crate::models::user::{User, UserUpdate};
use crate::services::admin_service::{
    AdminError, AdminService, DailyRevenue, Dashboard, ProductForm, UserForm, require_admin,
};
use crate::services::export::orders_to_csv;
use crate::services::image::ImageStore;
use crate::services::validation;
use async_trait::async_trait;
use tracing::{info, warn};

pub struct SeaOrmAdminService {
    store: Store,
    images: Arc<ImageStore>,
    catalog: CatalogConfig,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(store: Store, images: Arc<ImageStore>, catalog: CatalogConfig) -> Self {
        Self {
            store,
            images,
            catalog,
        }
    }

    fn product_input(&self, form: ProductForm) -> Result<ProductInput, AdminError> {
        let name = validation::require("Name", &form.name).map_err(AdminError::Validation)?;

        let price = Price::from_input(form.price).ok_or_else(|| {
            AdminError::Validation(format!("Invalid price: {}", form.price))
        })?;

        let category = form.category.trim().to_string();
        if !self.catalog.has_category(&category) {
            return Err(AdminError::Validation(format!(
                "Unknown category '{category}', expected one of: {}",
                self.catalog.categories.join(", ")
            )));
        }

        let description = form
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(ProductInput {
            name,
            price,
            description,
            category,
        })
    }

    async fn load_product(&self, id: ProductId) -> Result<Product, AdminError> {
        self.store
            .get_product(id.value())
            .await?
            .ok_or_else(|| AdminError::product_not_found(id))
    }

    async fn save_upload(&self, filename: &str, bytes: &[u8]) -> Result<String, AdminError> {
        self.images
            .check_filename(filename)
            .map_err(AdminError::Validation)?;

        if bytes.is_empty() {
            return Err(AdminError::Validation("Image upload is empty".to_string()));
        }

        self.images
            .save(bytes, filename)
            .await
            .map_err(|e| AdminError::StorageConflict(e.to_string()))
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn dashboard(&self, principal: Option<&Principal>) -> Result<Dashboard, AdminError> {
        require_admin(principal)?;

        let orders = self.store.list_orders().await?;

        let mut by_day: BTreeMap<String, Price> = BTreeMap::new();
        for order in &orders {
            let day = by_day.entry(order.order_date().to_string()).or_default();
            *day = day.saturating_add(order.total_amount);
        }

        let total_revenue: Price = orders.iter().map(|o| o.total_amount).sum();

        Ok(Dashboard {
            total_revenue,
            total_revenue_display: total_revenue.formatted(),
            revenue_by_day: by_day
                .into_iter()
                .map(|(date, total)| DailyRevenue {
                    date,
                    total_display: total.formatted(),
                    total,
                })
                .collect(),
            orders,
        })
    }

    async fn list_products(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Vec<Product>, AdminError> {
        require_admin(principal)?;
        Ok(self.store.list_products().await?)
    }

    async fn create_product(
        &self,
        principal: Option<&Principal>,
        form: ProductForm,
    ) -> Result<Product, AdminError> {
        require_admin(principal)?;
        let input = self.product_input(form)?;
        Ok(self.store.create_product(input).await?)
    }

    async fn update_product(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
        form: ProductForm,
    ) -> Result<Product, AdminError> {
        require_admin(principal)?;
        let input = self.product_input(form)?;

        if !self.store.update_product(id.value(), input).await? {
            return Err(AdminError::product_not_found(id));
        }

        info!(product_id = %id, "Updated product");
        self.load_product(id).await
    }

    async fn set_primary_image(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Product, AdminError> {
        require_admin(principal)?;
        self.load_product(id).await?;

        let reference = self.save_upload(filename, bytes).await?;

        match self.store.set_primary_image(id.value(), &reference).await {
            Ok(Some(previous)) => {
                if let Some(previous) = previous {
                    self.images.delete_all(&[previous]).await;
                }
            }
            Ok(None) => {
                self.images.delete_all(&[reference]).await;
                return Err(AdminError::product_not_found(id));
            }
            Err(e) => {
                self.images.delete_all(&[reference]).await;
                return Err(e.into());
            }
        }

        self.load_product(id).await
    }

    async fn add_secondary_image(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Product, AdminError> {
        require_admin(principal)?;
        self.load_product(id).await?;

        let reference = self.save_upload(filename, bytes).await?;
        let max = self.catalog.max_secondary_images;

        let outcome = match self
            .store
            .add_secondary_image(id.value(), &reference, max)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.images.delete_all(&[reference]).await;
                return Err(e.into());
            }
        };

        match outcome {
            SecondaryImageOutcome::Added => self.load_product(id).await,
            SecondaryImageOutcome::LimitReached => {
                self.images.delete_all(&[reference]).await;
                Err(AdminError::Validation(format!(
                    "A product can have at most {max} secondary images"
                )))
            }
            SecondaryImageOutcome::ProductMissing => {
                self.images.delete_all(&[reference]).await;
                Err(AdminError::product_not_found(id))
            }
        }
    }

    async fn clear_secondary_images(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
    ) -> Result<Product, AdminError> {
        require_admin(principal)?;
        self.load_product(id).await?;

        let removed = self.store.clear_secondary_images(id.value()).await?;
        self.images.delete_all(&removed).await;

        self.load_product(id).await
    }

    async fn delete_product(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
    ) -> Result<(), AdminError> {
        require_admin(principal)?;

        let files = self
            .store
            .delete_product_cascade(id.value())
            .await?
            .ok_or_else(|| AdminError::product_not_found(id))?;

        // Rows are gone at this point; a file that cannot be removed is only logged.
        self.images.delete_all(&files).await;
        Ok(())
    }

    async fn list_orders(&self, principal: Option<&Principal>) -> Result<Vec<Order>, AdminError> {
        require_admin(principal)?;
        Ok(self.store.list_orders().await?)
    }

    async fn delete_order(
        &self,
        principal: Option<&Principal>,
        id: OrderId,
    ) -> Result<(), AdminError> {
        require_admin(principal)?;

        if !self.store.delete_order_cascade(id.value()).await? {
            return Err(AdminError::NotFound(format!("Order {id}")));
        }
        Ok(())
    }

    async fn export_orders(&self, principal: Option<&Principal>) -> Result<String, AdminError> {
        require_admin(principal)?;
        let orders = self.store.list_orders().await?;
        Ok(orders_to_csv(&orders))
    }

    async fn list_users(&self, principal: Option<&Principal>) -> Result<Vec<User>, AdminError> {
        require_admin(principal)?;
        Ok(self.store.list_users().await?)
    }

    async fn update_user(
        &self,
        principal: Option<&Principal>,
        id: UserId,
        form: UserForm,
    ) -> Result<User, AdminError> {
        require_admin(principal)?;

        let name = validation::require("Name", &form.name).map_err(AdminError::Validation)?;
        let email = validation::validate_email(&form.email).map_err(AdminError::Validation)?;

        if let Some(owner) = self.store.get_user_by_email(&email).await?
            && owner.id != id
        {
            return Err(AdminError::DuplicateEmail);
        }

        let update = UserUpdate {
            name,
            email,
            is_admin: form.is_admin,
        };

        let user = self
            .store
            .update_user(id.value(), update)
            .await
            .map_err(|err| match unique_violation(&err) {
                Some(UniqueField::Email) => AdminError::DuplicateEmail,
                _ => AdminError::from(err),
            })?
            .ok_or_else(|| AdminError::NotFound(format!("User {id}")))?;

        info!(user_id = %id, is_admin = user.is_admin, "Updated user");
        Ok(user)
    }

    async fn delete_user(
        &self,
        principal: Option<&Principal>,
        id: UserId,
    ) -> Result<(), AdminError> {
        let admin = require_admin(principal)?;

        if admin.user_id == id {
            warn!(user_id = %id, "Refused self-delete");
            return Err(AdminError::SelfDeleteForbidden);
        }

        if !self.store.delete_user_cascade(id.value()).await? {
            return Err(AdminError::NotFound(format!("User {id}")));
        }
        Ok(())
    }
}
