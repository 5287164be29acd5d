use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AdminService, AuthService, CartService, CatalogService, CheckoutService, ImageStore,
    SeaOrmAdminService, SeaOrmAuthService, SeaOrmCartService, SeaOrmCatalogService,
    SeaOrmCheckoutService,
};

/// Everything a request handler or CLI command needs, built once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub images: Arc<ImageStore>,

    pub auth_service: Arc<dyn AuthService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub cart_service: Arc<dyn CartService>,

    pub checkout_service: Arc<dyn CheckoutService>,

    pub admin_service: Arc<dyn AdminService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wire the services around an already-open store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let images = Arc::new(ImageStore::new(&config.catalog));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let catalog_service = Arc::new(SeaOrmCatalogService::new(
            store.clone(),
            config.catalog.suggestion_limit,
        )) as Arc<dyn CatalogService>;

        let cart_service = Arc::new(SeaOrmCartService::new(store.clone())) as Arc<dyn CartService>;

        let checkout_service =
            Arc::new(SeaOrmCheckoutService::new(store.clone())) as Arc<dyn CheckoutService>;

        let admin_service = Arc::new(SeaOrmAdminService::new(
            store.clone(),
            images.clone(),
            config.catalog.clone(),
        )) as Arc<dyn AdminService>;

        Self {
            config: Arc::new(config),
            store,
            images,
            auth_service,
            catalog_service,
            cart_service,
            checkout_service,
            admin_service,
        }
    }
}
