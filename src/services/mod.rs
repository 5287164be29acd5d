pub mod image;
pub use image::ImageStore;

pub mod export;
pub mod validation;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, Registration, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService, Suggestion};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod cart_service;
pub mod cart_service_impl;
pub use cart_service::{CartError, CartService, CartSummary};
pub use cart_service_impl::SeaOrmCartService;

pub mod checkout_service;
pub mod checkout_service_impl;
pub use checkout_service::{CheckoutError, CheckoutService};
pub use checkout_service_impl::SeaOrmCheckoutService;

pub mod admin_service;
pub mod admin_service_impl;
pub use admin_service::{
    AdminError, AdminService, DailyRevenue, Dashboard, ProductForm, UserForm, require_admin,
};
pub use admin_service_impl::SeaOrmAdminService;
