//! Cart route handlers.
//!
//! Every handler extracts the authenticated user with [`RequireAuth`] and
//! passes the user ID into the cart service explicitly. Mutations respond
//! with the updated cart so clients never have to guess the new state.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use paperbark_core::{CartId, CartLineId, Price, ProductId, UserId};

use crate::db::{CartRepository, ProductRepository};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Cart, CartLine};
use crate::services::CartService;
use crate::state::AppState;

/// Cart response with computed totals.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    /// Cart ID.
    pub id: CartId,
    /// Lines with live product data.
    pub lines: Vec<CartLine>,
    /// Sum of line subtotals at current prices.
    pub total_price: Price,
    /// Sum of line quantities.
    pub total_quantity: u32,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let total_price = cart.total_price();
        let total_quantity = cart.total_quantity();
        Self {
            id: cart.id,
            lines: cart.lines,
            total_price,
            total_quantity,
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i32,
}

/// Update cart line request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub line_id: i32,
    pub quantity: i32,
}

/// Remove cart line request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub line_id: i32,
}

fn cart_service<'a>(
    state: &'a AppState,
) -> CartService<ProductRepository<'a>, CartRepository<'a>> {
    CartService::new(
        ProductRepository::new(state.pool()),
        CartRepository::new(state.pool()),
    )
}

async fn cart_response(state: &AppState, user: UserId) -> Result<CartResponse> {
    let cart = cart_service(state).view(user).await?;
    Ok(CartResponse::from(cart))
}

/// Show the user's cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    Ok(Json(cart_response(&state, user.id).await?))
}

/// Add one unit of a product to the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    cart_service(&state)
        .add(user.id, ProductId::new(body.product_id))
        .await?;

    let cart = cart_response(&state, user.id).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Set a line's quantity; zero or below removes the line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<CartResponse>> {
    cart_service(&state)
        .update_quantity(user.id, CartLineId::new(body.line_id), body.quantity)
        .await?;

    Ok(Json(cart_response(&state, user.id).await?))
}

/// Remove a line from the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<Json<CartResponse>> {
    cart_service(&state)
        .remove(user.id, CartLineId::new(body.line_id))
        .await?;

    Ok(Json(cart_response(&state, user.id).await?))
}

/// Remove every line from the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    cart_service(&state).clear(user.id).await?;

    Ok(Json(cart_response(&state, user.id).await?))
}
