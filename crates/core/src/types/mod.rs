//! Core types for Paperbark.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod price;
pub mod status;

pub use contact::{Email, EmailError, Phone, PhoneError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::OrderStatus;
