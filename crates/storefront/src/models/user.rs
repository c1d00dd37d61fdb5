//! User domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. Users exist only to own carts and orders; the password hash never
//! leaves the repository layer.

use chrono::{DateTime, Utc};

use paperbark_core::{Email, UserId};

/// A storefront user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address, unique across the store.
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
