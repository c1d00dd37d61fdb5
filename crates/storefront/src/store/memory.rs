//! In-memory storage backend.
//!
//! Implements [`Catalog`], [`CartStore`], and [`OrderStore`] over plain maps
//! behind a single mutex. Used by the service and integration tests; the
//! one-mutex design makes every operation atomic, mirroring the transaction
//! boundaries of the Postgres backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use paperbark_core::{
    CartId, CartLineId, OrderId, OrderLineId, OrderStatus, Price, ProductId, UserId,
};

use super::{Catalog, CartStore, OrderStore};
use crate::db::RepositoryError;
use crate::models::{
    Cart, CartLine, NewOrder, Order, OrderLine, Product, ProductQuery, ProductSort,
    ShippingDetails,
};

#[derive(Debug, Clone)]
struct StoredCart {
    id: CartId,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredCartLine {
    cart_id: CartId,
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
    added_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredOrderLine {
    id: OrderLineId,
    product_id: ProductId,
    quantity: u32,
    unit_price: Price,
}

#[derive(Debug, Clone)]
struct StoredOrder {
    user_id: UserId,
    status: OrderStatus,
    total_price: Price,
    shipping: ShippingDetails,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    lines: Vec<StoredOrderLine>,
}

#[derive(Debug, Default)]
struct Inner {
    products: BTreeMap<ProductId, Product>,
    carts: HashMap<UserId, StoredCart>,
    cart_lines: BTreeMap<CartLineId, StoredCartLine>,
    orders: BTreeMap<OrderId, StoredOrder>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn product_name(&self, id: ProductId) -> String {
        self.products
            .get(&id)
            .map_or_else(String::new, |p| p.name.clone())
    }

    fn cart_line_view(&self, id: CartLineId, stored: &StoredCartLine) -> CartLine {
        let product = self.products.get(&stored.product_id);
        CartLine {
            id,
            cart_id: stored.cart_id,
            product_id: stored.product_id,
            product_name: product.map_or_else(String::new, |p| p.name.clone()),
            unit_price: product.map_or(Price::ZERO, |p| p.price),
            is_available: product.is_some_and(|p| p.is_available),
            quantity: stored.quantity,
            added_at: stored.added_at,
        }
    }

    fn open_cart(&mut self, user: UserId) -> StoredCart {
        if let Some(cart) = self.carts.get(&user) {
            return cart.clone();
        }
        let cart = StoredCart {
            id: CartId::new(self.next_id()),
            created_at: Utc::now(),
        };
        self.carts.insert(user, cart.clone());
        cart
    }

    fn order_view(&self, id: OrderId, stored: &StoredOrder) -> Order {
        Order {
            id,
            user_id: stored.user_id,
            status: stored.status,
            total_price: stored.total_price,
            shipping: stored.shipping.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            lines: stored
                .lines
                .iter()
                .map(|line| OrderLine {
                    id: line.id,
                    order_id: id,
                    product_id: line.product_id,
                    product_name: self.product_name(line.product_id),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
        }
    }
}

/// Shared in-memory store.
///
/// Cloning is cheap and every clone sees the same data, so one store can
/// back the catalog, cart, and order sides of a test at once.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned mutex only means a test panicked mid-operation; the
        // data is still usable for inspection.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Insert a product into the catalog, returning it with its assigned ID.
    pub fn insert_product(
        &self,
        name: &str,
        description: &str,
        price: Price,
        is_available: bool,
    ) -> Product {
        let mut inner = self.lock();
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(inner.next_id()),
            name: name.to_owned(),
            description: description.to_owned(),
            price,
            is_available,
            created_at: now,
            updated_at: now,
        };
        inner.products.insert(product.id, product.clone());
        product
    }

    /// Change a product's price, as the catalog owner would.
    pub fn set_product_price(&self, id: ProductId, price: Price) {
        let mut inner = self.lock();
        if let Some(product) = inner.products.get_mut(&id) {
            product.price = price;
            product.updated_at = Utc::now();
        }
    }

    /// Change a product's availability, as the catalog owner would.
    pub fn set_product_availability(&self, id: ProductId, is_available: bool) {
        let mut inner = self.lock();
        if let Some(product) = inner.products.get_mut(&id) {
            product.is_available = is_available;
            product.updated_at = Utc::now();
        }
    }

    /// Force an order into a given status, bypassing transition rules.
    ///
    /// Stands in for the fulfillment-side updates that are outside the
    /// storefront; used to set up states like `processing` in tests.
    pub fn force_order_status(&self, id: OrderId, status: OrderStatus) {
        let mut inner = self.lock();
        if let Some(order) = inner.orders.get_mut(&id) {
            order.status = status;
            order.updated_at = Utc::now();
        }
    }
}

impl Catalog for MemoryStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.lock();
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut products: Vec<Product> = inner
            .products
            .values()
            .filter(|p| p.is_available)
            .filter(|p| {
                needle
                    .as_deref()
                    .is_none_or(|needle| p.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();
        match query.sort {
            ProductSort::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
            ProductSort::PriceAsc => products.sort_by_key(|p| p.price),
            ProductSort::PriceDesc => {
                products.sort_by_key(|p| p.price);
                products.reverse();
            }
            ProductSort::Newest => {
                products.sort_by_key(|p| (p.created_at, p.id));
                products.reverse();
            }
        }
        Ok(products)
    }
}

impl CartStore for MemoryStore {
    async fn open(&self, user: UserId) -> Result<Cart, RepositoryError> {
        let mut inner = self.lock();
        let cart = inner.open_cart(user);
        let lines = inner
            .cart_lines
            .iter()
            .filter(|(_, line)| line.cart_id == cart.id)
            .map(|(&id, line)| inner.cart_line_view(id, line))
            .collect();
        Ok(Cart {
            id: cart.id,
            user_id: user,
            lines,
            created_at: cart.created_at,
        })
    }

    async fn find_line(
        &self,
        user: UserId,
        line: CartLineId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let inner = self.lock();
        Ok(inner
            .cart_lines
            .get(&line)
            .filter(|stored| stored.user_id == user)
            .map(|stored| inner.cart_line_view(line, stored)))
    }

    async fn add_line(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<CartLine, RepositoryError> {
        let mut inner = self.lock();
        let cart = inner.open_cart(user);

        let existing = inner
            .cart_lines
            .iter_mut()
            .find(|(_, line)| line.cart_id == cart.id && line.product_id == product)
            .map(|(&id, line)| {
                line.quantity += 1;
                id
            });

        let id = match existing {
            Some(id) => id,
            None => {
                let id = CartLineId::new(inner.next_id());
                inner.cart_lines.insert(
                    id,
                    StoredCartLine {
                        cart_id: cart.id,
                        user_id: user,
                        product_id: product,
                        quantity: 1,
                        added_at: Utc::now(),
                    },
                );
                id
            }
        };

        let stored = inner
            .cart_lines
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        Ok(inner.cart_line_view(id, &stored))
    }

    async fn set_line_quantity(
        &self,
        user: UserId,
        line: CartLineId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let mut inner = self.lock();
        match inner
            .cart_lines
            .get_mut(&line)
            .filter(|stored| stored.user_id == user)
        {
            Some(stored) => {
                stored.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_line(&self, user: UserId, line: CartLineId) -> Result<bool, RepositoryError> {
        let mut inner = self.lock();
        let owned = inner
            .cart_lines
            .get(&line)
            .is_some_and(|stored| stored.user_id == user);
        if owned {
            inner.cart_lines.remove(&line);
        }
        Ok(owned)
    }

    async fn clear(&self, user: UserId) -> Result<u64, RepositoryError> {
        let mut inner = self.lock();
        let before = inner.cart_lines.len();
        inner.cart_lines.retain(|_, line| line.user_id != user);
        Ok((before - inner.cart_lines.len()) as u64)
    }
}

impl OrderStore for MemoryStore {
    async fn create(&self, user: UserId, order: NewOrder) -> Result<Order, RepositoryError> {
        // Single lock guards the whole operation: order insert, line copies,
        // and cart-clear are atomic, like the Postgres transaction.
        let mut inner = self.lock();
        let now = Utc::now();
        let id = OrderId::new(inner.next_id());
        let lines = order
            .lines
            .iter()
            .map(|line| StoredOrderLine {
                id: OrderLineId::new(inner.next_id()),
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();
        let stored = StoredOrder {
            user_id: user,
            status: OrderStatus::Pending,
            total_price: order.total_price,
            shipping: order.shipping,
            created_at: now,
            updated_at: now,
            lines,
        };
        inner.orders.insert(id, stored);
        inner.cart_lines.retain(|_, line| line.user_id != user);

        let stored = inner.orders.get(&id).cloned().ok_or(RepositoryError::NotFound)?;
        Ok(inner.order_view(id, &stored))
    }

    async fn get(&self, user: UserId, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let inner = self.lock();
        Ok(inner
            .orders
            .get(&id)
            .filter(|stored| stored.user_id == user)
            .map(|stored| inner.order_view(id, stored)))
    }

    async fn list(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.lock();
        let mut orders: Vec<Order> = inner
            .orders
            .iter()
            .filter(|(_, stored)| stored.user_id == user)
            .map(|(&id, stored)| inner.order_view(id, stored))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn list_with_status(
        &self,
        user: UserId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = self.list(user).await?;
        orders.retain(|order| order.status == status);
        Ok(orders)
    }

    async fn transition(
        &self,
        user: UserId,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let mut inner = self.lock();
        match inner
            .orders
            .get_mut(&id)
            .filter(|stored| stored.user_id == user && stored.status == from)
        {
            Some(stored) => {
                stored.status = to;
                stored.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self, user: UserId) -> Result<u64, RepositoryError> {
        let inner = self.lock();
        Ok(inner
            .orders
            .values()
            .filter(|stored| stored.user_id == user)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).expect("valid price")
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails::new("1 Main St", "+1 555 867 5309", "buyer@example.com", None)
            .expect("valid shipping details")
    }

    #[tokio::test]
    async fn open_creates_the_cart_once() {
        let store = MemoryStore::new();
        let user = UserId::new(1);

        let first = store.open(user).await.expect("open cart");
        let second = store.open(user).await.expect("open cart");
        assert_eq!(first.id, second.id);
        assert!(first.is_empty());
    }

    #[tokio::test]
    async fn add_line_merges_duplicates() {
        let store = MemoryStore::new();
        let user = UserId::new(1);
        let product = store.insert_product("Book", "", price(1000), true);

        let line = store.add_line(user, product.id).await.expect("add");
        assert_eq!(line.quantity, 1);
        let line = store.add_line(user, product.id).await.expect("add again");
        assert_eq!(line.quantity, 2);

        let cart = store.open(user).await.expect("open cart");
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[tokio::test]
    async fn lines_are_invisible_to_other_users() {
        let store = MemoryStore::new();
        let owner = UserId::new(1);
        let stranger = UserId::new(2);
        let product = store.insert_product("Book", "", price(1000), true);

        let line = store.add_line(owner, product.id).await.expect("add");

        assert!(
            store
                .find_line(stranger, line.id)
                .await
                .expect("find")
                .is_none()
        );
        assert!(!store.delete_line(stranger, line.id).await.expect("delete"));
        assert!(
            !store
                .set_line_quantity(stranger, line.id, 5)
                .await
                .expect("set quantity")
        );
        // Owner still sees the untouched line
        let cart = store.open(owner).await.expect("open cart");
        assert_eq!(cart.total_quantity(), 1);
    }

    #[tokio::test]
    async fn create_order_clears_only_that_users_cart() {
        let store = MemoryStore::new();
        let buyer = UserId::new(1);
        let other = UserId::new(2);
        let product = store.insert_product("Book", "", price(1000), true);
        store.add_line(buyer, product.id).await.expect("add");
        store.add_line(other, product.id).await.expect("add");

        let order = store
            .create(
                buyer,
                NewOrder {
                    total_price: price(1000),
                    shipping: shipping(),
                    lines: vec![crate::models::NewOrderLine {
                        product_id: product.id,
                        quantity: 1,
                        unit_price: price(1000),
                    }],
                },
            )
            .await
            .expect("create order");

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(store.open(buyer).await.expect("open").is_empty());
        assert_eq!(store.open(other).await.expect("open").total_quantity(), 1);
    }

    #[tokio::test]
    async fn transition_is_conditional() {
        let store = MemoryStore::new();
        let user = UserId::new(1);
        let product = store.insert_product("Book", "", price(1000), true);
        store.add_line(user, product.id).await.expect("add");
        let order = store
            .create(
                user,
                NewOrder {
                    total_price: price(1000),
                    shipping: shipping(),
                    lines: vec![],
                },
            )
            .await
            .expect("create order");

        // Wrong expected-from leaves the order untouched
        assert!(
            !store
                .transition(user, order.id, OrderStatus::Processing, OrderStatus::Shipped)
                .await
                .expect("transition")
        );
        assert!(
            store
                .transition(user, order.id, OrderStatus::Pending, OrderStatus::Cancelled)
                .await
                .expect("transition")
        );
        let order = store
            .get(user, order.id)
            .await
            .expect("get")
            .expect("order exists");
        assert_eq!(order.status, OrderStatus::Cancelled);
    }
}
