use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod cart;
mod catalog;
mod error;
mod observability;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::services::{AdminService, AuthService, CartService, CatalogService, CheckoutService};
use metrics_exporter_prometheus::PrometheusHandle;

/// Upper bound for raw image upload bodies.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn catalog_service(&self) -> &Arc<dyn CatalogService> {
        &self.shared.catalog_service
    }

    #[must_use]
    pub fn cart_service(&self) -> &Arc<dyn CartService> {
        &self.shared.cart_service
    }

    #[must_use]
    pub fn checkout_service(&self) -> &Arc<dyn CheckoutService> {
        &self.shared.checkout_service
    }

    #[must_use]
    pub fn admin_service(&self) -> &Arc<dyn AdminService> {
        &self.shared.admin_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config();
    let images_path = state.shared.images.root().to_path_buf();
    let cors_origins = config.server.cors_allowed_origins.clone();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            config.server.session_inactivity_minutes,
        )));

    let api_router = Router::new()
        .merge(public_routes())
        .merge(customer_routes())
        .merge(admin_routes())
        .route_layer(middleware::from_fn(observability::tag_matched_route))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::load_principal,
        ))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/images", tower_http::services::ServeDir::new(images_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(catalog::list_products))
        .route("/products/{id}", get(catalog::get_product))
        .route(
            "/categories/{category}/products",
            get(catalog::list_by_category),
        )
        .route("/search", get(catalog::search))
        .route("/search/suggestions", get(catalog::suggestions))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/system/health/live", get(system::health_live))
        .route("/system/health/ready", get(system::health_ready))
}

fn customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/cart", get(cart::get_cart))
        .route(
            "/cart/{product_id}",
            post(cart::add_to_cart)
                .put(cart::update_quantity)
                .delete(cart::remove_from_cart),
        )
        .route(
            "/checkout",
            get(cart::checkout_summary).post(cart::checkout),
        )
        .route("/orders", get(cart::list_orders))
        .route("/orders/{id}", get(cart::get_order))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route(
            "/admin/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route(
            "/admin/products/{id}/image",
            put(admin::set_primary_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/admin/products/{id}/images",
            post(admin::add_secondary_image)
                .delete(admin::clear_secondary_images)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/export", get(admin::export_orders))
        .route("/admin/orders/{id}", delete(admin::delete_order))
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/admin/metrics", get(admin::metrics))
}
