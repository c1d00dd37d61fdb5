//! Cart domain types.
//!
//! A cart is a per-user aggregate of lines. Totals are always computed from
//! the lines at read time and never stored, so they cannot drift from the
//! underlying data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use paperbark_core::{CartId, CartLineId, Price, ProductId, UserId};

/// One product-quantity entry in a cart.
///
/// Carries the live product name, price, and availability as of the read
/// that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    /// Unique line ID.
    pub id: CartLineId,
    /// Cart this line belongs to.
    pub cart_id: CartId,
    /// Product referenced by this line.
    pub product_id: ProductId,
    /// Product name at read time.
    pub product_name: String,
    /// Current product unit price (not yet frozen - that happens at checkout).
    pub unit_price: Price,
    /// Whether the product is still available.
    pub is_available: bool,
    /// Quantity, always at least 1.
    pub quantity: u32,
    /// When the product was first added to the cart.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Subtotal for this line at the current product price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A user's cart with its lines materialized.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning user. Exactly one cart exists per user.
    pub user_id: UserId,
    /// Lines currently in the cart.
    pub lines: Vec<CartLine>,
    /// When the cart was first created.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Total price across all lines at current product prices.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).expect("valid price")
    }

    fn line(id: i32, unit_cents: i64, quantity: u32) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            cart_id: CartId::new(1),
            product_id: ProductId::new(id),
            product_name: format!("Product {id}"),
            unit_price: price(unit_cents),
            is_available: true,
            quantity,
            added_at: Utc::now(),
        }
    }

    fn cart(lines: Vec<CartLine>) -> Cart {
        Cart {
            id: CartId::new(1),
            user_id: UserId::new(1),
            lines,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn totals_are_sums_over_lines() {
        let cart = cart(vec![line(1, 1000, 2), line(2, 500, 1)]);
        assert_eq!(cart.total_price(), price(2500));
        assert_eq!(cart.total_quantity(), 3);
        assert!(!cart.is_empty());
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let cart = cart(vec![]);
        assert_eq!(cart.total_price(), Price::ZERO);
        assert_eq!(cart.total_quantity(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn line_total_scales_by_quantity() {
        assert_eq!(line(1, 1050, 3).line_total(), price(3150));
    }
}
