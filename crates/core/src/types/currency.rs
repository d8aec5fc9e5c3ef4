//! Display currency for carts and purchases.
//!
//! The backend stores the currency of a purchase as a free-form ISO 4217
//! code, so this is a validated string newtype rather than a closed enum.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currencies offered first in selection UIs, most common ones up front.
pub const POPULAR_CURRENCIES: &[&str] = &[
    "USD", "EUR", "CNY", "JPY", "GBP", "INR", "BRL", "AUD", "CAD", "CHF", "MXN", "KRW", "TRY",
    "ZAR",
];

/// Errors that can occur when parsing a [`Currency`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CurrencyError {
    /// The input is not a three-letter alphabetic code.
    #[error("currency must be a three-letter ISO 4217 code, got {0:?}")]
    InvalidCode(String),
}

/// An ISO 4217 currency code (e.g. "EUR", "USD").
///
/// Stored uppercased. The default is EUR, matching the application's
/// default display currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Parse a currency code, uppercasing the input.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyError::InvalidCode`] unless the input is exactly
    /// three ASCII letters.
    pub fn parse(s: &str) -> Result<Self, CurrencyError> {
        let trimmed = s.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCode(s.to_owned()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display symbol for well-known currencies, falling back
    /// to the code itself.
    #[must_use]
    pub fn symbol(&self) -> &str {
        match self.0.as_str() {
            "USD" | "AUD" | "CAD" | "MXN" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" | "CNY" => "¥",
            "INR" => "₹",
            "BRL" => "R$",
            "KRW" => "₩",
            "TRY" => "₺",
            "ZAR" => "R",
            "CHF" => "CHF",
            _ => &self.0,
        }
    }

    /// Format an amount in this currency with two decimal places,
    /// e.g. `€3.27`.
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol(), amount.round_dp(2))
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("EUR".to_owned())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
