//! Admin back-office endpoints.
//!
//! Handlers pass the caller's (optional) principal straight to
//! [`AdminService`](crate::services::AdminService), which rejects anyone
//! without the privileged flag.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_id, validate_upload_filename};
use super::{
    ApiError, ApiResponse, AppState, DashboardDto, MessageResponse, OrderDto, ProductDto, UserDto,
};
use crate::domain::{OrderId, ProductId, UserId};
use crate::services::{AdminError, ProductForm, UserForm, require_admin};

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    /// In thousands; stored ×1000.
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
}

impl From<ProductRequest> for ProductForm {
    fn from(req: ProductRequest) -> Self {
        Self {
            name: req.name,
            price: req.price,
            description: req.description,
            category: req.category,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Forbidden | AdminError::SelfDeleteForbidden => {
                Self::Forbidden(err.to_string())
            }
            AdminError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            AdminError::DuplicateEmail => Self::Conflict(err.to_string()),
            AdminError::Validation(msg) => Self::validation(msg),
            AdminError::StorageConflict(msg) => Self::storage_conflict(&msg),
        }
    }
}

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<ApiResponse<DashboardDto>>, ApiError> {
    let dashboard = state.admin_service().dashboard(principal.as_ref()).await?;
    Ok(Json(ApiResponse::success(dashboard.into())))
}

/// GET /admin/products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let products = state
        .admin_service()
        .list_products(principal.as_ref())
        .await?;

    Ok(Json(ApiResponse::success(
        products.into_iter().map(ProductDto::from).collect(),
    )))
}

/// POST /admin/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let product = state
        .admin_service()
        .create_product(principal.as_ref(), payload.into())
        .await?;

    Ok(Json(ApiResponse::success(product.into())))
}

/// PUT /admin/products/{id}
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id("product", id)?;
    let product = state
        .admin_service()
        .update_product(principal.as_ref(), ProductId::new(id), payload.into())
        .await?;

    Ok(Json(ApiResponse::success(product.into())))
}

/// DELETE /admin/products/{id}
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("product", id)?;
    state
        .admin_service()
        .delete_product(principal.as_ref(), ProductId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Product deleted",
    ))))
}

/// PUT /admin/products/{id}/image?filename=
/// The request body is the raw image.
pub async fn set_primary_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id("product", id)?;
    let filename = validate_upload_filename(query.filename.as_deref())?;

    let product = state
        .admin_service()
        .set_primary_image(principal.as_ref(), ProductId::new(id), filename, &body)
        .await?;

    Ok(Json(ApiResponse::success(product.into())))
}

/// POST /admin/products/{id}/images?filename=
pub async fn add_secondary_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id("product", id)?;
    let filename = validate_upload_filename(query.filename.as_deref())?;

    let product = state
        .admin_service()
        .add_secondary_image(principal.as_ref(), ProductId::new(id), filename, &body)
        .await?;

    Ok(Json(ApiResponse::success(product.into())))
}

/// DELETE /admin/products/{id}/images
pub async fn clear_secondary_images(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id("product", id)?;
    let product = state
        .admin_service()
        .clear_secondary_images(principal.as_ref(), ProductId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(product.into())))
}

/// DELETE /admin/orders/{id}
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("order", id)?;
    state
        .admin_service()
        .delete_order(principal.as_ref(), OrderId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Order deleted",
    ))))
}

/// GET /admin/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    let orders = state.admin_service().list_orders(principal.as_ref()).await?;
    Ok(Json(ApiResponse::success(
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}

/// GET /admin/orders/export
pub async fn export_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Response, ApiError> {
    let csv = state
        .admin_service()
        .export_orders(principal.as_ref())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"orders.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.admin_service().list_users(principal.as_ref()).await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// PUT /admin/users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id("user", id)?;
    let user = state
        .admin_service()
        .update_user(
            principal.as_ref(),
            UserId::new(id),
            UserForm {
                name: payload.name,
                email: payload.email,
                is_admin: payload.is_admin,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("user", id)?;
    state
        .admin_service()
        .delete_user(principal.as_ref(), UserId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new("User deleted"))))
}

/// GET /admin/metrics
pub async fn metrics(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<String, ApiError> {
    require_admin(principal.as_ref())?;

    Ok(state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    ))
}
