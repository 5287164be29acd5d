//! Signed-in endpoints for the cart, checkout and order history.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::RequireUser;
use super::validation::{validate_add_quantity, validate_id};
use super::{
    ApiError, ApiResponse, AppState, CartDto, CartTotalDto, MessageResponse, OrderDto,
};
use crate::domain::{OrderId, ProductId};
use crate::services::{CartError, CheckoutError};

#[derive(Debug, Default, Deserialize)]
pub struct AddToCartRequest {
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub payment_method: String,
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotFound(id) => Self::not_found("Product", id),
            CartError::Validation(msg) => Self::validation(msg),
            CartError::StorageConflict(msg) => Self::storage_conflict(&msg),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart => Self::Conflict(err.to_string()),
            CheckoutError::NotFound(id) => Self::not_found("Order", id),
            CheckoutError::Validation(msg) => Self::validation(msg),
            CheckoutError::StorageConflict(msg) => Self::storage_conflict(&msg),
        }
    }
}

/// GET /cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    let summary = state.cart_service().list(&principal).await?;
    Ok(Json(ApiResponse::success(summary.into())))
}

/// POST /cart/{product_id}
/// Body is optional; quantity defaults to 1.
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
    Path(product_id): Path<i32>,
    payload: Option<Json<AddToCartRequest>>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let product_id = validate_id("product", product_id)?;
    let quantity = payload.and_then(|Json(p)| p.quantity).unwrap_or(1);
    let quantity = validate_add_quantity(quantity)?;

    state
        .cart_service()
        .add(&principal, ProductId::new(product_id), quantity)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Product added to cart",
    ))))
}

/// PUT /cart/{product_id}
/// A quantity of zero or less removes the entry. Returns the new total.
pub async fn update_quantity(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
    Path(product_id): Path<i32>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<Json<ApiResponse<CartTotalDto>>, ApiError> {
    let product_id = validate_id("product", product_id)?;

    let total = state
        .cart_service()
        .set_quantity(&principal, ProductId::new(product_id), payload.quantity)
        .await?;

    Ok(Json(ApiResponse::success(CartTotalDto {
        total: total.into(),
    })))
}

/// DELETE /cart/{product_id}
pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let product_id = validate_id("product", product_id)?;

    state
        .cart_service()
        .remove(&principal, ProductId::new(product_id))
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Product removed from cart",
    ))))
}

/// GET /checkout
pub async fn checkout_summary(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    let summary = state.checkout_service().checkout_summary(&principal).await?;
    Ok(Json(ApiResponse::success(summary.into())))
}

/// POST /checkout
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
    payload: Option<Json<CheckoutRequest>>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let payment_method = payload.map(|Json(p)| p.payment_method).unwrap_or_default();

    let order = state
        .checkout_service()
        .checkout(&principal, &payment_method)
        .await?;

    Ok(Json(ApiResponse::success(order.into())))
}

/// GET /orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    let orders = state.checkout_service().order_history(&principal).await?;
    Ok(Json(ApiResponse::success(
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = validate_id("order", id)?;
    let order = state
        .checkout_service()
        .get_order(&principal, OrderId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(order.into())))
}
