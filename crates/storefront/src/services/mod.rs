//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - User registration and login (the identity collaborator)
//! - `cart` - Cart operations: add, update quantity, remove, clear
//! - `checkout` - Order builder: cart-to-order snapshot and cancellation
//!
//! The cart and checkout services are generic over the storage traits in
//! [`crate::store`], so the same logic runs against Postgres in production
//! and the in-memory store in tests. Every method takes the requesting
//! user's ID explicitly - there is no ambient request state.

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use checkout::{CheckoutError, CheckoutService};
