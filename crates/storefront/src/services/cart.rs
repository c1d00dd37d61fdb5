//! Cart operations.
//!
//! All mutation goes through here so the rules live in one place: product
//! availability is re-checked on every add, quantities at or below zero mean
//! removal, and a line that is not in the requesting user's cart is
//! indistinguishable from one that does not exist.

use thiserror::Error;

use paperbark_core::{CartLineId, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::{Cart, CartLine};
use crate::store::{Catalog, CartStore};

/// Errors produced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product does not exist or is not available for sale.
    #[error("product not found")]
    ProductNotFound,

    /// The line does not exist in the requesting user's cart.
    #[error("cart line not found")]
    LineNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart operations over a catalog and a cart store.
pub struct CartService<C, S> {
    catalog: C,
    store: S,
}

impl<C: Catalog, S: CartStore> CartService<C, S> {
    /// Create a new cart service.
    pub const fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    /// The user's cart, materialized with live product data. Creates the
    /// cart lazily on first use.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn view(&self, user: UserId) -> Result<Cart, CartError> {
        Ok(self.store.open(user).await?)
    }

    /// Add one unit of a product to the user's cart.
    ///
    /// An existing line for the product gains quantity 1; otherwise a new
    /// line with quantity 1 is created. Availability is checked against the
    /// catalog here, at add time - never against an earlier read.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the product is missing or
    /// unavailable.
    pub async fn add(&self, user: UserId, product_id: ProductId) -> Result<CartLine, CartError> {
        let product = self
            .catalog
            .product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;
        if !product.is_available {
            // An unavailable product is indistinguishable from a missing one
            // to the buyer.
            return Err(CartError::ProductNotFound);
        }

        Ok(self.store.add_line(user, product.id).await?)
    }

    /// Set a line's quantity exactly.
    ///
    /// A quantity at or below zero deletes the line - that is a removal, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not in the user's
    /// cart.
    pub async fn update_quantity(
        &self,
        user: UserId,
        line: CartLineId,
        new_quantity: i32,
    ) -> Result<(), CartError> {
        match u32::try_from(new_quantity) {
            Ok(quantity) if quantity > 0 => {
                if self.store.set_line_quantity(user, line, quantity).await? {
                    Ok(())
                } else {
                    Err(CartError::LineNotFound)
                }
            }
            // Zero or negative: treat as removal.
            _ => self.remove(user, line).await,
        }
    }

    /// Remove a line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not in the user's
    /// cart - including when it was already removed, so callers must treat
    /// that error on remove as already-satisfied.
    pub async fn remove(&self, user: UserId, line: CartLineId) -> Result<(), CartError> {
        if self.store.delete_line(user, line).await? {
            Ok(())
        } else {
            Err(CartError::LineNotFound)
        }
    }

    /// Remove every line from the user's cart, returning how many lines
    /// were deleted. An empty cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn clear(&self, user: UserId) -> Result<u64, CartError> {
        Ok(self.store.clear(user).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperbark_core::Price;
    use rust_decimal::Decimal;

    use crate::models::Product;
    use crate::store::MemoryStore;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).expect("valid price")
    }

    fn service(store: &MemoryStore) -> CartService<MemoryStore, MemoryStore> {
        CartService::new(store.clone(), store.clone())
    }

    fn seed_product(store: &MemoryStore, name: &str, cents: i64, available: bool) -> Product {
        store.insert_product(name, "", price(cents), available)
    }

    #[tokio::test]
    async fn add_creates_cart_and_line() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let product = seed_product(&store, "Paper", 1000, true);

        let line = cart.add(user, product.id).await.expect("add");
        assert_eq!(line.quantity, 1);
        assert_eq!(line.unit_price, price(1000));

        let view = cart.view(user).await.expect("view");
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.total_quantity(), 1);
    }

    #[tokio::test]
    async fn adding_same_product_twice_merges_lines() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let product = seed_product(&store, "Paper", 1000, true);

        cart.add(user, product.id).await.expect("first add");
        cart.add(user, product.id).await.expect("second add");

        let view = cart.view(user).await.expect("view");
        assert_eq!(view.lines.len(), 1, "one line, not two");
        assert_eq!(view.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn add_rejects_missing_product() {
        let store = MemoryStore::new();
        let cart = service(&store);

        let err = cart
            .add(UserId::new(1), paperbark_core::ProductId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound));
    }

    #[tokio::test]
    async fn add_rejects_unavailable_product() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let product = seed_product(&store, "Paper", 1000, false);

        let err = cart.add(user, product.id).await.unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound));
        assert!(cart.view(user).await.expect("view").is_empty());
    }

    #[tokio::test]
    async fn availability_is_rechecked_on_every_add() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let product = seed_product(&store, "Paper", 1000, true);

        cart.add(user, product.id).await.expect("add while available");
        store.set_product_availability(product.id, false);

        let err = cart.add(user, product.id).await.unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound));
        // The earlier line is untouched
        assert_eq!(cart.view(user).await.expect("view").total_quantity(), 1);
    }

    #[tokio::test]
    async fn update_quantity_sets_exactly() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let product = seed_product(&store, "Paper", 1000, true);
        let line = cart.add(user, product.id).await.expect("add");

        cart.update_quantity(user, line.id, 5).await.expect("update");
        let view = cart.view(user).await.expect("view");
        assert_eq!(view.lines[0].quantity, 5);
    }

    #[tokio::test]
    async fn update_quantity_zero_removes_line() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let product = seed_product(&store, "Paper", 1000, true);
        let line = cart.add(user, product.id).await.expect("add");

        cart.update_quantity(user, line.id, 0)
            .await
            .expect("zero quantity is a removal, not an error");
        assert!(cart.view(user).await.expect("view").is_empty());
    }

    #[tokio::test]
    async fn update_quantity_negative_removes_line() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let product = seed_product(&store, "Paper", 1000, true);
        let line = cart.add(user, product.id).await.expect("add");

        cart.update_quantity(user, line.id, -3).await.expect("remove");
        assert!(cart.view(user).await.expect("view").is_empty());
    }

    #[tokio::test]
    async fn update_quantity_on_foreign_line_is_not_found() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let owner = UserId::new(1);
        let stranger = UserId::new(2);
        let product = seed_product(&store, "Paper", 1000, true);
        let line = cart.add(owner, product.id).await.expect("add");

        let err = cart.update_quantity(stranger, line.id, 5).await.unwrap_err();
        assert!(matches!(err, CartError::LineNotFound));
        assert_eq!(cart.view(owner).await.expect("view").lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn remove_twice_reports_not_found() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let product = seed_product(&store, "Paper", 1000, true);
        let line = cart.add(user, product.id).await.expect("add");

        cart.remove(user, line.id).await.expect("first remove");
        let err = cart.remove(user, line.id).await.unwrap_err();
        assert!(matches!(err, CartError::LineNotFound));
    }

    #[tokio::test]
    async fn clear_empties_the_cart_and_is_idempotent() {
        let store = MemoryStore::new();
        let cart = service(&store);
        let user = UserId::new(1);
        let paper = seed_product(&store, "Paper", 1000, true);
        let ink = seed_product(&store, "Ink", 500, true);
        cart.add(user, paper.id).await.expect("add");
        cart.add(user, ink.id).await.expect("add");

        assert_eq!(cart.clear(user).await.expect("clear"), 2);
        assert!(cart.view(user).await.expect("view").is_empty());
        // Clearing an empty cart is a no-op
        assert_eq!(cart.clear(user).await.expect("clear again"), 0);
    }
}
