//! Integration tests for Paperbark.
//!
//! The flows in `tests/` exercise the cart and checkout services end to end
//! against the shared in-memory store - no database required. This module
//! holds the common fixtures.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paperbark-integration-tests
//! ```

use paperbark_core::Price;
use rust_decimal::Decimal;

use paperbark_storefront::models::{Product, ShippingDetails};
use paperbark_storefront::services::{CartService, CheckoutService};
use paperbark_storefront::store::MemoryStore;

/// Cart service wired to a shared in-memory store.
pub type TestCartService = CartService<MemoryStore, MemoryStore>;
/// Checkout service wired to a shared in-memory store.
pub type TestCheckoutService = CheckoutService<MemoryStore, MemoryStore>;

/// A storefront-in-a-box: one shared store plus the services under test.
pub struct TestStorefront {
    /// The shared backing store; also acts as the catalog owner.
    pub store: MemoryStore,
    /// Cart operations.
    pub cart: TestCartService,
    /// Order builder.
    pub checkout: TestCheckoutService,
}

impl TestStorefront {
    /// An empty storefront.
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let cart = CartService::new(store.clone(), store.clone());
        let checkout = CheckoutService::new(store.clone(), store.clone());
        Self {
            store,
            cart,
            checkout,
        }
    }

    /// Add an available product to the catalog.
    pub fn product(&self, name: &str, cents: i64) -> Product {
        self.store.insert_product(name, "", price(cents), true)
    }
}

impl Default for TestStorefront {
    fn default() -> Self {
        Self::new()
    }
}

/// A price from an integer number of cents.
///
/// # Panics
///
/// Panics if `cents` is negative; fixtures only use valid prices.
#[must_use]
pub fn price(cents: i64) -> Price {
    Price::new(Decimal::new(cents, 2)).expect("valid price")
}

/// Valid shipping details for checkout calls.
#[must_use]
pub fn shipping() -> ShippingDetails {
    ShippingDetails::new(
        "12 Birch Lane, Springfield",
        "+1 555 867 5309",
        "buyer@example.com",
        None,
    )
    .expect("valid shipping details")
}
