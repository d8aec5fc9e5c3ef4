//! Purchases: finalized, server-persisted snapshots of a cart.
//!
//! These are read-mostly client views. The client never mutates a purchase
//! except via create (checkout) and delete by ID.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::currency::Currency;
use crate::types::id::PurchaseId;
use crate::types::line_item::LineItem;

/// One line of a persisted purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItem {
    /// Product name.
    pub name: String,
    /// Unit price, a decimal string on the wire.
    pub unit_price: Decimal,
    /// Quantity.
    pub quantity: u32,
    /// Server-side creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PurchaseItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A purchase as returned by the backend.
///
/// Wire values are assumed valid; fields the backend may omit carry serde
/// defaults so partial list payloads still normalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Server-generated identifier.
    pub id: PurchaseId,
    /// Name the user gave the cart at checkout.
    #[serde(default)]
    pub cart_name: String,
    /// When the purchase was completed.
    pub completed_at: DateTime<Utc>,
    /// Store name, when one was entered.
    #[serde(default)]
    pub store_name: Option<String>,
    /// Display currency at checkout time.
    #[serde(default)]
    pub currency: Currency,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// User-assigned tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Number of items, as counted by the server.
    #[serde(default)]
    pub items_count: u32,
    /// Server-computed total. Absent in some list payloads; use
    /// [`Purchase::total`] for display.
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    /// Idempotency key the purchase was created with, if any.
    #[serde(default)]
    pub idempotency_key: Option<String>,
    /// Line items; only present in detail payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PurchaseItem>>,
}

impl Purchase {
    /// The total to display: the server total when present, otherwise
    /// recomputed from the items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.total_amount.unwrap_or_else(|| {
            self.items
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(PurchaseItem::line_total)
                .sum()
        })
    }
}

/// Body of a create-purchase (checkout) request.
#[derive(Debug, Clone, Serialize)]
pub struct NewPurchase {
    /// Name for the saved cart.
    pub cart_name: String,
    /// Store name, possibly empty.
    pub store_name: String,
    /// Display currency at checkout time.
    pub currency: Currency,
    /// Items snapshotted from the cart.
    pub items: Vec<NewPurchaseItem>,
}

/// One line of a create-purchase request.
#[derive(Debug, Clone, Serialize)]
pub struct NewPurchaseItem {
    /// Product name.
    pub name: String,
    /// Unit price, serialized as a decimal string.
    pub unit_price: Decimal,
    /// Quantity.
    pub quantity: u32,
}

impl NewPurchase {
    /// Snapshot the current cart into a checkout payload.
    #[must_use]
    pub fn from_cart(
        cart_name: impl Into<String>,
        store_name: impl Into<String>,
        currency: Currency,
        items: &[LineItem],
    ) -> Self {
        Self {
            cart_name: cart_name.into(),
            store_name: store_name.into(),
            currency,
            items: items
                .iter()
                .map(|item| NewPurchaseItem {
                    name: item.item_name.clone(),
                    unit_price: item.item_price,
                    quantity: item.item_amount,
                })
                .collect(),
        }
    }
}

/// Normalize a list response into a vec of purchases.
///
/// The backend may answer with a plain array, a `{ "results": [...] }` page
/// envelope, or a single object. Records that do not look like a purchase
/// are dropped rather than failing the whole response.
#[must_use]
pub fn normalize_purchases(resp: serde_json::Value) -> Vec<Purchase> {
    match resp {
        serde_json::Value::Array(values) => values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        serde_json::Value::Object(mut map) => {
            if let Some(serde_json::Value::Array(values)) = map.remove("results") {
                return values
                    .into_iter()
                    .filter_map(|v| serde_json::from_value(v).ok())
                    .collect();
            }
            serde_json::from_value(serde_json::Value::Object(map))
                .map(|p| vec![p])
                .unwrap_or_default()
        }
        _ => Vec::new(),
    }
}
