//! User preferences: the selected display currency.

use anycart_core::Currency;

use crate::storage::{StorageDir, keys};

/// Durable user preferences.
#[derive(Debug, Clone)]
pub struct Prefs {
    storage: StorageDir,
}

impl Prefs {
    /// Create a preference store over `storage`.
    #[must_use]
    pub const fn new(storage: StorageDir) -> Self {
        Self { storage }
    }

    /// The selected display currency, defaulting to EUR when unset or
    /// unparseable.
    #[must_use]
    pub fn selected_currency(&self) -> Currency {
        self.storage
            .get(keys::CURRENCY)
            .and_then(|raw| Currency::parse(&raw).ok())
            .unwrap_or_default()
    }

    /// Persist the selected display currency, best-effort.
    pub fn set_selected_currency(&self, currency: &Currency) {
        self.storage.put(keys::CURRENCY, currency.as_str());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_prefs() -> (tempfile::TempDir, Prefs) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(dir.path().to_path_buf());
        (dir, Prefs::new(storage))
    }

    #[test]
    fn test_default_currency() {
        let (_guard, prefs) = temp_prefs();
        assert_eq!(prefs.selected_currency().as_str(), "EUR");
    }

    #[test]
    fn test_set_then_get() {
        let (_guard, prefs) = temp_prefs();
        prefs.set_selected_currency(&Currency::parse("USD").unwrap());
        assert_eq!(prefs.selected_currency().as_str(), "USD");
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let (_guard, prefs) = temp_prefs();
        prefs.storage.put(keys::CURRENCY, "not-a-code");
        assert_eq!(prefs.selected_currency().as_str(), "EUR");
    }
}
