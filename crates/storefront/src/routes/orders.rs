//! Checkout and order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use paperbark_core::{OrderId, OrderStatus};

use crate::db::{CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, ShippingDetails};
use crate::services::CheckoutService;
use crate::state::AppState;

/// Checkout request body. Address, phone, and email are required; notes
/// are optional.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub phone: String,
    pub email: String,
    pub notes: Option<String>,
}

/// Order listing query parameters.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    /// Optional status filter (`pending`, `processing`, ...).
    pub status: Option<String>,
}

/// Order listing response.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    /// Total number of orders the user has placed, unfiltered.
    pub order_count: u64,
}

fn checkout_service<'a>(
    state: &'a AppState,
) -> CheckoutService<CartRepository<'a>, OrderRepository<'a>> {
    CheckoutService::new(
        CartRepository::new(state.pool()),
        OrderRepository::new(state.pool()),
    )
}

/// Convert the cart into a pending order.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let shipping = ShippingDetails::new(
        &body.shipping_address,
        &body.phone,
        &body.email,
        body.notes.as_deref(),
    )?;

    let order = checkout_service(&state).checkout(user.id, shipping).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Order history, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>> {
    let service = checkout_service(&state);

    let orders = match params.status.as_deref() {
        Some(raw) => {
            let status = raw
                .parse::<OrderStatus>()
                .map_err(AppError::Validation)?;
            service.orders_with_status(user.id, status).await?
        }
        None => service.orders(user.id).await?,
    };
    let order_count = service.order_count(user.id).await?;

    Ok(Json(OrderListResponse {
        orders,
        order_count,
    }))
}

/// Order detail with lines.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Order>> {
    let order = checkout_service(&state)
        .order(user.id, OrderId::new(id))
        .await?;

    Ok(Json(order))
}

/// Cancel a pending order.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Order>> {
    let order = checkout_service(&state)
        .cancel(user.id, OrderId::new(id))
        .await?;

    Ok(Json(order))
}
