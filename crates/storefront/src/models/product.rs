//! Catalog product types.
//!
//! Products are owned by the catalog; the cart and order code treats them as
//! read-only except for the availability flag, which is re-checked on every
//! add-to-cart.

use chrono::{DateTime, Utc};
use serde::Serialize;

use paperbark_core::{Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Current unit price.
    pub price: Price,
    /// Whether the product can currently be added to carts.
    pub is_available: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Sort orders accepted by the product listing.
///
/// Anything else coming in from the query string falls back to
/// [`ProductSort::Newest`], matching the listing's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Alphabetical by name.
    Name,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Most recently created first.
    #[default]
    Newest,
}

impl ProductSort {
    /// Parse a query-string sort key, falling back to the default.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("name") => Self::Name,
            Some("price") => Self::PriceAsc,
            Some("-price") => Self::PriceDesc,
            _ => Self::Newest,
        }
    }

    /// The ORDER BY clause for this sort. Static strings only - never
    /// interpolate user input into SQL.
    #[must_use]
    pub const fn order_by(&self) -> &'static str {
        match self {
            Self::Name => "name ASC, id ASC",
            Self::PriceAsc => "price ASC, id ASC",
            Self::PriceDesc => "price DESC, id ASC",
            Self::Newest => "created_at DESC, id DESC",
        }
    }
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    /// Sort order.
    pub sort: ProductSort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_param_whitelist() {
        assert_eq!(ProductSort::from_param(Some("name")), ProductSort::Name);
        assert_eq!(ProductSort::from_param(Some("price")), ProductSort::PriceAsc);
        assert_eq!(
            ProductSort::from_param(Some("-price")),
            ProductSort::PriceDesc
        );
        assert_eq!(
            ProductSort::from_param(Some("-created_at")),
            ProductSort::Newest
        );
        // Unknown keys fall back instead of erroring
        assert_eq!(
            ProductSort::from_param(Some("id; DROP TABLE products")),
            ProductSort::Newest
        );
        assert_eq!(ProductSort::from_param(None), ProductSort::Newest);
    }
}
