//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when validating a [`LineItem`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum LineItemError {
    /// The item name is empty or whitespace.
    #[error("item name cannot be empty")]
    EmptyName,
    /// The quantity is zero.
    #[error("item quantity must be at least 1")]
    ZeroAmount,
    /// The unit price is negative.
    #[error("item price cannot be negative")]
    NegativePrice,
}

/// One product entry in the cart: name, quantity and unit price.
///
/// ## Invariants
///
/// - `item_amount >= 1` and `item_price >= 0` when created through
///   [`LineItem::new`]
/// - `id` is unique within a cart list
/// - insertion order is the display order (most-recent-first)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Client-generated identifier, unique within the cart.
    pub id: Uuid,
    /// Product name as entered by the user.
    pub item_name: String,
    /// Quantity.
    pub item_amount: u32,
    /// Unit price in the selected display currency.
    pub item_price: Decimal,
}

impl LineItem {
    /// Create a validated line item with a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns a [`LineItemError`] when the name is blank, the quantity is
    /// zero, or the price is negative.
    pub fn new(
        item_name: impl Into<String>,
        item_amount: u32,
        item_price: Decimal,
    ) -> Result<Self, LineItemError> {
        Self::with_id(Uuid::new_v4(), item_name, item_amount, item_price)
    }

    /// Create a validated line item reusing an existing ID.
    ///
    /// Used by the edit path, which replaces an item in place.
    ///
    /// # Errors
    ///
    /// Same validation as [`LineItem::new`].
    pub fn with_id(
        id: Uuid,
        item_name: impl Into<String>,
        item_amount: u32,
        item_price: Decimal,
    ) -> Result<Self, LineItemError> {
        let item_name = item_name.into();
        if item_name.trim().is_empty() {
            return Err(LineItemError::EmptyName);
        }
        if item_amount == 0 {
            return Err(LineItemError::ZeroAmount);
        }
        if item_price < Decimal::ZERO {
            return Err(LineItemError::NegativePrice);
        }
        Ok(Self {
            id,
            item_name,
            item_amount,
            item_price,
        })
    }

    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.item_price * Decimal::from(self.item_amount)
    }
}

/// Grand total over a list of line items.
#[must_use]
pub fn cart_total(items: &[LineItem]) -> Decimal {
    items.iter().map(LineItem::line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_new_validates_name() {
        assert!(matches!(
            LineItem::new("", 1, price(100)),
            Err(LineItemError::EmptyName)
        ));
        assert!(matches!(
            LineItem::new("   ", 1, price(100)),
            Err(LineItemError::EmptyName)
        ));
    }

    #[test]
    fn test_new_validates_amount() {
        assert!(matches!(
            LineItem::new("Milk", 0, price(89)),
            Err(LineItemError::ZeroAmount)
        ));
    }

    #[test]
    fn test_new_validates_price() {
        assert!(matches!(
            LineItem::new("Milk", 1, price(-1)),
            Err(LineItemError::NegativePrice)
        ));
        // Zero price is allowed.
        assert!(LineItem::new("Milk", 1, Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_line_total() {
        let item = LineItem::new("Milk", 2, price(89)).unwrap();
        assert_eq!(item.line_total(), price(178));
    }

    #[test]
    fn test_cart_total() {
        let milk = LineItem::new("Milk", 2, price(89)).unwrap();
        let bread = LineItem::new("Bread", 1, price(149)).unwrap();
        assert_eq!(cart_total(&[milk, bread]), price(327));
    }

    #[test]
    fn test_serde_roundtrip() {
        let item = LineItem::new("Milk", 2, price(89)).unwrap();
        let json = serde_json::to_string(&item).unwrap();
        let parsed: LineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
    }
}
