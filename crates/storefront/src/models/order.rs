//! Order domain types.
//!
//! Orders are immutable snapshots of a checked-out cart. Line prices are
//! frozen at checkout time; later catalog price changes never touch an
//! existing order. Only the status field ever changes after creation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use paperbark_core::{
    Email, EmailError, OrderId, OrderLineId, OrderStatus, Phone, PhoneError, Price, ProductId,
    UserId,
};

/// Errors produced when validating shipping details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShippingError {
    /// The shipping address is missing.
    #[error("shipping address is required")]
    AddressRequired,
    /// The shipping address exceeds the length limit.
    #[error("shipping address must be at most {max} characters")]
    AddressTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The phone number failed validation.
    #[error("invalid phone number: {0}")]
    Phone(#[from] PhoneError),
    /// The contact email failed validation.
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

/// Validated shipping and contact details supplied at checkout.
///
/// Address, phone, and email are required; notes are optional. An empty or
/// whitespace-only notes field is normalized to `None`.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingDetails {
    /// Full delivery address.
    pub address: String,
    /// Contact phone number.
    pub phone: Phone,
    /// Contact email.
    pub email: Email,
    /// Free-form order notes.
    pub notes: Option<String>,
}

impl ShippingDetails {
    /// Maximum length of the shipping address.
    pub const MAX_ADDRESS_LENGTH: usize = 500;

    /// Validate raw checkout input into shipping details.
    ///
    /// # Errors
    ///
    /// Returns a [`ShippingError`] naming the first field that failed.
    pub fn new(
        address: &str,
        phone: &str,
        email: &str,
        notes: Option<&str>,
    ) -> Result<Self, ShippingError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ShippingError::AddressRequired);
        }
        if address.len() > Self::MAX_ADDRESS_LENGTH {
            return Err(ShippingError::AddressTooLong {
                max: Self::MAX_ADDRESS_LENGTH,
            });
        }

        let phone = Phone::parse(phone.trim())?;
        let email = Email::parse(email.trim())?;
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            address: address.to_owned(),
            phone,
            email,
            notes,
        })
    }
}

/// One product-quantity-price entry in an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    /// Unique line ID.
    pub id: OrderLineId,
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Product that was purchased.
    pub product_id: ProductId,
    /// Product name (joined from the catalog for display).
    pub product_name: String,
    /// Quantity purchased.
    pub quantity: u32,
    /// Unit price at the time of the order. Never changes afterwards.
    pub unit_price: Price,
}

impl OrderLine {
    /// Subtotal for this line at the frozen price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A completed order with its lines materialized.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// User who placed the order.
    pub user_id: UserId,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Total price, frozen at creation. Equals the sum of line subtotals
    /// at that moment.
    pub total_price: Price,
    /// Shipping and contact details.
    pub shipping: ShippingDetails,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated (status changes only).
    pub updated_at: DateTime<Utc>,
    /// Lines in the order.
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Sum of line subtotals at the frozen prices.
    ///
    /// For a consistent order this always equals `total_price`; it exists so
    /// callers (and tests) can verify that without trusting the stored total.
    #[must_use]
    pub fn computed_total(&self) -> Price {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}

/// A line of an order about to be created: the frozen copy of a cart line.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Quantity from the cart line.
    pub quantity: u32,
    /// Current product price, about to be frozen.
    pub unit_price: Price,
}

/// An order about to be created. Status is always `pending` on insert, so
/// it does not appear here.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Total at current prices, computed by the checkout service.
    pub total_price: Price,
    /// Validated shipping details.
    pub shipping: ShippingDetails,
    /// Frozen copies of the cart lines.
    pub lines: Vec<NewOrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_requires_address() {
        let err = ShippingDetails::new("  ", "+7 912 345 67 89", "a@b.com", None).unwrap_err();
        assert_eq!(err, ShippingError::AddressRequired);
    }

    #[test]
    fn shipping_rejects_oversized_address() {
        let long = "x".repeat(ShippingDetails::MAX_ADDRESS_LENGTH + 1);
        let err = ShippingDetails::new(&long, "+7 912 345 67 89", "a@b.com", None).unwrap_err();
        assert!(matches!(err, ShippingError::AddressTooLong { .. }));
    }

    #[test]
    fn shipping_validates_phone_and_email() {
        assert!(matches!(
            ShippingDetails::new("1 Main St", "bad", "a@b.com", None),
            Err(ShippingError::Phone(_))
        ));
        assert!(matches!(
            ShippingDetails::new("1 Main St", "+7 912 345 67 89", "not-an-email", None),
            Err(ShippingError::Email(_))
        ));
    }

    #[test]
    fn blank_notes_become_none() {
        let details =
            ShippingDetails::new("1 Main St", "+7 912 345 67 89", "a@b.com", Some("   "))
                .expect("valid details");
        assert_eq!(details.notes, None);

        let details =
            ShippingDetails::new("1 Main St", "+7 912 345 67 89", "a@b.com", Some(" gift wrap "))
                .expect("valid details");
        assert_eq!(details.notes.as_deref(), Some("gift wrap"));
    }
}
