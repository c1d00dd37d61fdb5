//! Product route handlers (catalog reads).

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use paperbark_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{Product, ProductQuery, ProductSort};
use crate::state::AppState;
use crate::store::Catalog;

/// Product listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Name search, case-insensitive substring.
    pub q: Option<String>,
    /// Sort key: `name`, `price`, `-price` (anything else means newest).
    pub sort: Option<String>,
}

/// List available products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>> {
    let catalog = ProductRepository::new(state.pool());
    let query = ProductQuery {
        search: params.q.filter(|q| !q.trim().is_empty()),
        sort: ProductSort::from_param(params.sort.as_deref()),
    };

    let products = catalog.products(&query).await?;
    Ok(Json(products))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let catalog = ProductRepository::new(state.pool());
    let product = catalog
        .product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    Ok(Json(product))
}
