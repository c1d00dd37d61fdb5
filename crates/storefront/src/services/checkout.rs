//! Order builder: the cart-to-order transition.
//!
//! Checkout reads the cart, computes the total at current product prices,
//! and hands the store a fully-priced order draft to persist atomically
//! alongside the cart-clear. Prices are frozen in the draft - the catalog
//! can change afterwards without touching the order.

use thiserror::Error;

use paperbark_core::{OrderId, OrderStatus, UserId};

use crate::db::RepositoryError;
use crate::models::{NewOrder, NewOrderLine, Order, ShippingDetails};
use crate::store::{CartStore, OrderStore};

/// Errors produced by checkout and order operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was attempted with no lines in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The order does not exist or belongs to another user.
    #[error("order not found")]
    OrderNotFound,

    /// The requested status change is not a legal transition.
    #[error("order cannot be cancelled from status {from}")]
    InvalidTransition {
        /// The order's status at the time of the attempt.
        from: OrderStatus,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order builder over a cart store and an order store.
pub struct CheckoutService<S, O> {
    carts: S,
    orders: O,
}

impl<S: CartStore, O: OrderStore> CheckoutService<S, O> {
    /// Create a new checkout service.
    pub const fn new(carts: S, orders: O) -> Self {
        Self { carts, orders }
    }

    /// Convert the user's cart into a pending order and empty the cart.
    ///
    /// The order's total and line prices are the product prices as of this
    /// call; they never change afterwards. Order creation and cart-clearing
    /// are one atomic unit - on any failure the cart remains intact and no
    /// order exists.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines; no order
    /// row is created in that case.
    pub async fn checkout(
        &self,
        user: UserId,
        shipping: ShippingDetails,
    ) -> Result<Order, CheckoutError> {
        let cart = self.carts.open(user).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // Freeze quantities and current unit prices into the draft.
        let lines: Vec<NewOrderLine> = cart
            .lines
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();
        let total_price = cart.total_price();

        let order = self
            .orders
            .create(
                user,
                NewOrder {
                    total_price,
                    shipping,
                    lines,
                },
            )
            .await?;

        Ok(order)
    }

    /// Cancel one of the user's orders.
    ///
    /// Permitted only while the order is still `pending`; the transition is
    /// a compare-and-set, so a concurrent status change cannot be
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderNotFound` if the order does not exist or
    /// is not the user's. Returns `CheckoutError::InvalidTransition` for any
    /// status other than `pending`, leaving the status unchanged.
    pub async fn cancel(&self, user: UserId, id: OrderId) -> Result<Order, CheckoutError> {
        let order = self
            .orders
            .get(user, id)
            .await?
            .ok_or(CheckoutError::OrderNotFound)?;

        if !order.status.can_cancel() {
            return Err(CheckoutError::InvalidTransition { from: order.status });
        }

        let moved = self
            .orders
            .transition(user, id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await?;
        if !moved {
            // The status moved between our read and the compare-and-set;
            // report the current state.
            let current = self
                .orders
                .get(user, id)
                .await?
                .ok_or(CheckoutError::OrderNotFound)?;
            return Err(CheckoutError::InvalidTransition {
                from: current.status,
            });
        }

        self.orders
            .get(user, id)
            .await?
            .ok_or(CheckoutError::OrderNotFound)
    }

    /// Fetch one of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderNotFound` if the order does not exist or
    /// is not the user's.
    pub async fn order(&self, user: UserId, id: OrderId) -> Result<Order, CheckoutError> {
        self.orders
            .get(user, id)
            .await?
            .ok_or(CheckoutError::OrderNotFound)
    }

    /// List the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the store fails.
    pub async fn orders(&self, user: UserId) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.list(user).await?)
    }

    /// List the user's orders with the given status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the store fails.
    pub async fn orders_with_status(
        &self,
        user: UserId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.list_with_status(user, status).await?)
    }

    /// Number of orders the user has placed.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the store fails.
    pub async fn order_count(&self, user: UserId) -> Result<u64, CheckoutError> {
        Ok(self.orders.count(user).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperbark_core::Price;
    use rust_decimal::Decimal;

    use crate::services::cart::CartService;
    use crate::store::MemoryStore;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).expect("valid price")
    }

    fn checkout_service(store: &MemoryStore) -> CheckoutService<MemoryStore, MemoryStore> {
        CheckoutService::new(store.clone(), store.clone())
    }

    fn cart_service(store: &MemoryStore) -> CartService<MemoryStore, MemoryStore> {
        CartService::new(store.clone(), store.clone())
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails::new(
            "12 Birch Lane, Springfield",
            "+1 555 867 5309",
            "buyer@example.com",
            Some("leave at the door"),
        )
        .expect("valid shipping details")
    }

    #[tokio::test]
    async fn checkout_on_empty_cart_creates_nothing() {
        let store = MemoryStore::new();
        let service = checkout_service(&store);
        let user = UserId::new(1);

        let err = service.checkout(user, shipping()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(service.order_count(user).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn checkout_snapshots_the_cart() {
        let store = MemoryStore::new();
        let cart = cart_service(&store);
        let service = checkout_service(&store);
        let user = UserId::new(1);

        let paper = store.insert_product("Paper", "", price(1000), true);
        let ink = store.insert_product("Ink", "", price(500), true);
        cart.add(user, paper.id).await.expect("add");
        cart.add(user, paper.id).await.expect("add");
        cart.add(user, ink.id).await.expect("add");

        let order = service.checkout(user, shipping()).await.expect("checkout");

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, price(2500));
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.computed_total(), order.total_price);

        // The cart is emptied as part of the same operation
        assert!(cart.view(user).await.expect("view").is_empty());
    }

    #[tokio::test]
    async fn order_prices_are_frozen_against_catalog_changes() {
        let store = MemoryStore::new();
        let cart = cart_service(&store);
        let service = checkout_service(&store);
        let user = UserId::new(1);

        let paper = store.insert_product("Paper", "", price(1000), true);
        cart.add(user, paper.id).await.expect("add");
        let order = service.checkout(user, shipping()).await.expect("checkout");

        // The catalog doubles the price afterwards
        store.set_product_price(paper.id, price(2000));

        let reread = service.order(user, order.id).await.expect("order");
        assert_eq!(reread.total_price, price(1000));
        assert_eq!(reread.lines[0].unit_price, price(1000));
    }

    #[tokio::test]
    async fn cancel_pending_order() {
        let store = MemoryStore::new();
        let cart = cart_service(&store);
        let service = checkout_service(&store);
        let user = UserId::new(1);

        let paper = store.insert_product("Paper", "", price(1000), true);
        cart.add(user, paper.id).await.expect("add");
        let order = service.checkout(user, shipping()).await.expect("checkout");

        let cancelled = service.cancel(user, order.id).await.expect("cancel");
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_is_rejected_once_processing() {
        let store = MemoryStore::new();
        let cart = cart_service(&store);
        let service = checkout_service(&store);
        let user = UserId::new(1);

        let paper = store.insert_product("Paper", "", price(1000), true);
        cart.add(user, paper.id).await.expect("add");
        let order = service.checkout(user, shipping()).await.expect("checkout");
        store.force_order_status(order.id, OrderStatus::Processing);

        let err = service.cancel(user, order.id).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidTransition {
                from: OrderStatus::Processing
            }
        ));
        // Status is untouched
        let order = service.order(user, order.id).await.expect("order");
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn cancellation_is_irreversible() {
        let store = MemoryStore::new();
        let cart = cart_service(&store);
        let service = checkout_service(&store);
        let user = UserId::new(1);

        let paper = store.insert_product("Paper", "", price(1000), true);
        cart.add(user, paper.id).await.expect("add");
        let order = service.checkout(user, shipping()).await.expect("checkout");
        service.cancel(user, order.id).await.expect("cancel");

        let err = service.cancel(user, order.id).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidTransition {
                from: OrderStatus::Cancelled
            }
        ));
    }

    #[tokio::test]
    async fn orders_of_other_users_are_invisible() {
        let store = MemoryStore::new();
        let cart = cart_service(&store);
        let service = checkout_service(&store);
        let buyer = UserId::new(1);
        let stranger = UserId::new(2);

        let paper = store.insert_product("Paper", "", price(1000), true);
        cart.add(buyer, paper.id).await.expect("add");
        let order = service.checkout(buyer, shipping()).await.expect("checkout");

        let err = service.order(stranger, order.id).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound));
        let err = service.cancel(stranger, order.id).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound));
    }

    #[tokio::test]
    async fn listing_filters_by_status() {
        let store = MemoryStore::new();
        let cart = cart_service(&store);
        let service = checkout_service(&store);
        let user = UserId::new(1);
        let paper = store.insert_product("Paper", "", price(1000), true);

        cart.add(user, paper.id).await.expect("add");
        let first = service.checkout(user, shipping()).await.expect("checkout");
        cart.add(user, paper.id).await.expect("add");
        let second = service.checkout(user, shipping()).await.expect("checkout");
        service.cancel(user, first.id).await.expect("cancel");

        assert_eq!(service.orders(user).await.expect("orders").len(), 2);
        let pending = service
            .orders_with_status(user, OrderStatus::Pending)
            .await
            .expect("pending orders");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);
        assert_eq!(service.order_count(user).await.expect("count"), 2);
    }
}
