//! Database operations for the storefront `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `users` - Site authentication
//! - `products` - Catalog (read-only to the cart/order code)
//! - `carts` / `cart_lines` - One cart per user, unique line per product
//! - `orders` / `order_lines` - Checkout snapshots with frozen prices
//! - tower-sessions storage (created by the session store itself)
//!
//! All queries use the runtime `sqlx` API with bound parameters; rows are
//! mapped into the domain models by hand so invalid stored data surfaces as
//! [`RepositoryError::DataCorruption`] instead of leaking outward.
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p paperbark-cli -- migrate
//! ```

pub mod carts;
pub mod catalog;
pub mod orders;
pub mod users;

pub use carts::CartRepository;
pub use catalog::ProductRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored data failed domain validation on the way out.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The referenced row does not exist.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
