//! Domain models for the storefront.
//!
//! These are fully-materialized value objects, separate from database row
//! types. Cart lines carry the live product name, price, and availability so
//! totals and price snapshots can be computed without reaching back into the
//! database.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine};
pub use order::{NewOrder, NewOrderLine, Order, OrderLine, ShippingDetails, ShippingError};
pub use product::{Product, ProductQuery, ProductSort};
pub use session::{CurrentUser, session_keys};
pub use user::User;
