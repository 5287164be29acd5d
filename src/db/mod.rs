use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::cart::CartLine;
use crate::models::order::Order;
use crate::models::product::{Product, ProductInput};
use crate::models::user::{NewUser, User, UserUpdate};

pub mod migrator;
pub mod repositories;

pub use repositories::product::SecondaryImageOutcome;

/// Which unique column a failed insert/update collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    Other,
}

/// Inspect an error chain for a unique-constraint violation.
#[must_use]
pub fn unique_violation(err: &anyhow::Error) -> Option<UniqueField> {
    let db_err = err.downcast_ref::<DbErr>()?;
    match db_err.sql_err()? {
        SqlErr::UniqueConstraintViolation(message) => {
            let field = if message.contains("users.username") {
                UniqueField::Username
            } else if message.contains("users.email") {
                UniqueField::Email
            } else {
                UniqueField::Other
            };
            Some(field)
        }
        _ => None,
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Each in-memory connection would otherwise see its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn product_repo(&self) -> repositories::product::ProductRepository {
        repositories::product::ProductRepository::new(self.conn.clone())
    }

    fn cart_repo(&self) -> repositories::cart::CartRepository {
        repositories::cart::CartRepository::new(self.conn.clone())
    }

    fn order_repo(&self) -> repositories::order::OrderRepository {
        repositories::order::OrderRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo()
            .verify_credentials(username, password)
            .await
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().create(new_user).await
    }

    pub async fn update_user(&self, id: i32, update: UserUpdate) -> Result<Option<User>> {
        self.user_repo().update(id, update).await
    }

    pub async fn delete_user_cascade(&self, id: i32) -> Result<bool> {
        self.user_repo().delete_cascade(id).await
    }

    // ========== Catalog ==========

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.product_repo().list_all().await
    }

    pub async fn list_products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        self.product_repo().list_by_category(category).await
    }

    pub async fn search_products(&self, query: &str, limit: Option<u64>) -> Result<Vec<Product>> {
        self.product_repo().search(query, limit).await
    }

    pub async fn get_product(&self, id: i32) -> Result<Option<Product>> {
        self.product_repo().get(id).await
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product> {
        self.product_repo().create(input).await
    }

    pub async fn update_product(&self, id: i32, input: ProductInput) -> Result<bool> {
        self.product_repo().update(id, input).await
    }

    pub async fn set_primary_image(
        &self,
        id: i32,
        image_url: &str,
    ) -> Result<Option<Option<String>>> {
        self.product_repo().set_primary_image(id, image_url).await
    }

    pub async fn add_secondary_image(
        &self,
        id: i32,
        image_url: &str,
        max: usize,
    ) -> Result<SecondaryImageOutcome> {
        self.product_repo()
            .add_secondary_image(id, image_url, max)
            .await
    }

    pub async fn clear_secondary_images(&self, id: i32) -> Result<Vec<String>> {
        self.product_repo().clear_secondary_images(id).await
    }

    pub async fn delete_product_cascade(&self, id: i32) -> Result<Option<Vec<String>>> {
        self.product_repo().delete_cascade(id).await
    }

    // ========== Cart ==========

    /// Returns `false` when the entry's quantity would overflow.
    pub async fn add_to_cart(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<bool> {
        self.cart_repo()
            .upsert_add(user_id, product_id, quantity)
            .await
    }

    pub async fn set_cart_quantity(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<bool> {
        self.cart_repo()
            .set_quantity(user_id, product_id, quantity)
            .await
    }

    pub async fn remove_from_cart(&self, user_id: i32, product_id: i32) -> Result<bool> {
        self.cart_repo().remove(user_id, product_id).await
    }

    pub async fn cart_quantity(&self, user_id: i32, product_id: i32) -> Result<Option<i32>> {
        self.cart_repo().quantity_of(user_id, product_id).await
    }

    pub async fn list_cart(&self, user_id: i32) -> Result<Vec<CartLine>> {
        self.cart_repo().list(user_id).await
    }

    // ========== Orders ==========

    pub async fn place_order(
        &self,
        user_id: i32,
        payment_method: Option<String>,
    ) -> Result<Option<Order>> {
        self.order_repo().place(user_id, payment_method).await
    }

    pub async fn get_order(&self, id: i32) -> Result<Option<Order>> {
        self.order_repo().get(id).await
    }

    pub async fn list_orders_for_user(&self, user_id: i32) -> Result<Vec<Order>> {
        self.order_repo().list_for_user(user_id).await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.order_repo().list_all().await
    }

    pub async fn delete_order_cascade(&self, id: i32) -> Result<bool> {
        self.order_repo().delete_cascade(id).await
    }
}
