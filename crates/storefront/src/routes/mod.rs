//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Products (catalog reads)
//! GET  /products               - Available products (?q= search, ?sort=)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (requires auth)
//! GET  /cart                   - Cart with computed totals
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Set a line's quantity (<= 0 removes)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Remove all lines
//!
//! # Checkout & orders (requires auth)
//! POST /checkout               - Convert the cart into a pending order
//! GET  /orders                 - Order history (?status= filter)
//! GET  /orders/{id}            - Order detail with lines
//! POST /orders/{id}/cancel     - Cancel a pending order
//!
//! # Auth
//! POST /auth/register          - Register and log in
//! POST /auth/login             - Log in
//! POST /auth/logout            - Log out
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(orders::checkout))
        .nest("/orders", order_routes())
        .nest("/auth", auth_routes())
}
