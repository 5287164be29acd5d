//! Public catalog endpoints. Handlers only map HTTP to [`CatalogService`]
//! calls.
//!
//! [`CatalogService`]: crate::services::CatalogService

use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::validation::{validate_id, validate_search_query};
use super::{ApiError, ApiResponse, AppState, ProductDto, SearchQuery, SuggestionDto};
use crate::domain::ProductId;
use crate::services::CatalogError;

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::not_found("Product", id),
            CatalogError::StorageConflict(msg) => Self::storage_conflict(&msg),
        }
    }
}

fn to_dtos(products: Vec<crate::models::product::Product>) -> Vec<ProductDto> {
    products.into_iter().map(ProductDto::from).collect()
}

/// GET /products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let products = state.catalog_service().list_products().await?;
    Ok(Json(ApiResponse::success(to_dtos(products))))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id("product", id)?;
    let product = state
        .catalog_service()
        .get_product(ProductId::new(id))
        .await?;

    Ok(Json(ApiResponse::success(product.into())))
}

/// GET /categories/{category}/products
pub async fn list_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let products = state.catalog_service().list_by_category(&category).await?;
    Ok(Json(ApiResponse::success(to_dtos(products))))
}

/// GET /search?q=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let q = validate_search_query(&query.q)?;
    let products = state.catalog_service().search(q).await?;
    Ok(Json(ApiResponse::success(to_dtos(products))))
}

/// GET /search/suggestions?q=
pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SuggestionDto>>>, ApiError> {
    let q = validate_search_query(&query.q)?;
    let suggestions = state.catalog_service().suggestions(q).await?;

    Ok(Json(ApiResponse::success(
        suggestions.into_iter().map(SuggestionDto::from).collect(),
    )))
}
