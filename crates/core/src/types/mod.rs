//! Core types for AnyCart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod currency;
pub mod email;
pub mod id;
pub mod line_item;
pub mod purchase;
pub mod user;

pub use currency::{Currency, CurrencyError, POPULAR_CURRENCIES};
pub use email::{Email, EmailError};
pub use id::*;
pub use line_item::{LineItem, LineItemError, cart_total};
pub use purchase::{NewPurchase, NewPurchaseItem, Purchase, PurchaseItem, normalize_purchases};
pub use user::User;
