//! Storage interfaces for the storefront core.
//!
//! Cart and order logic is written against these traits rather than a live
//! database, so ownership checks and price-snapshot behavior are testable
//! with the in-memory implementation in [`memory`]. The Postgres
//! implementations live in [`crate::db`].
//!
//! Methods return `impl Future + Send` so generic callers (axum handlers)
//! produce `Send` futures; implementations write plain `async fn`.

pub mod memory;

pub use memory::MemoryStore;

use std::future::Future;

use paperbark_core::{CartLineId, OrderId, OrderStatus, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::{Cart, CartLine, NewOrder, Order, Product, ProductQuery};

/// Read-only access to the product catalog.
///
/// The catalog is an external collaborator from the core's perspective:
/// products can appear, change price, or become unavailable at any time,
/// which is why availability is re-checked at add-to-cart time.
pub trait Catalog {
    /// Fetch a product by ID, available or not.
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// List available products matching `query`.
    fn products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;
}

/// Persistence for carts and their lines.
///
/// Every method takes the requesting user and only ever touches that user's
/// cart; a line ID belonging to another user's cart behaves exactly like a
/// missing line.
pub trait CartStore {
    /// Get the user's cart with lines materialized, creating the cart row
    /// lazily if this is the user's first interaction.
    fn open(&self, user: UserId) -> impl Future<Output = Result<Cart, RepositoryError>> + Send;

    /// Find a single line in the user's cart.
    fn find_line(
        &self,
        user: UserId,
        line: CartLineId,
    ) -> impl Future<Output = Result<Option<CartLine>, RepositoryError>> + Send;

    /// Add one unit of `product` to the user's cart: an existing line for the
    /// product gains quantity 1, otherwise a new line with quantity 1 is
    /// created. Creates the cart itself if absent.
    fn add_line(
        &self,
        user: UserId,
        product: ProductId,
    ) -> impl Future<Output = Result<CartLine, RepositoryError>> + Send;

    /// Set a line's quantity exactly. Returns `false` if the line is not in
    /// the user's cart.
    fn set_line_quantity(
        &self,
        user: UserId,
        line: CartLineId,
        quantity: u32,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete a line. Returns `false` if the line is not in the user's cart.
    fn delete_line(
        &self,
        user: UserId,
        line: CartLineId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete all lines in the user's cart, returning how many were removed.
    /// A cart with no lines is a no-op.
    fn clear(&self, user: UserId) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Persistence for orders.
pub trait OrderStore {
    /// Persist a new order with status `pending` and clear the user's cart,
    /// atomically: the order row, its lines, and the cart-clear all commit
    /// or all roll back together.
    fn create(
        &self,
        user: UserId,
        order: NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Fetch one of the user's orders with lines materialized.
    fn get(
        &self,
        user: UserId,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// List the user's orders, newest first.
    fn list(&self, user: UserId)
    -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// List the user's orders with the given status, newest first.
    fn list_with_status(
        &self,
        user: UserId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// Conditionally move an order from `from` to `to`. Returns `false`
    /// without changing anything if the order's current status is not
    /// `from`, so concurrent transitions cannot double-apply.
    fn transition(
        &self,
        user: UserId,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Number of orders the user has placed.
    fn count(&self, user: UserId) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}
