//! Cart state manager.
//!
//! Holds the in-memory list of line items, mirrors it to the cart storage
//! cell after every mutation, and reconciles with out-of-band changes to
//! the same file (e.g. edits made by another running instance).
//!
//! A store only persists after it has loaded: loading happens in
//! [`CartStore::open`], so a fresh empty list can never clobber previously
//! persisted items. Cross-process conflicts are last-writer-wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anycart_core::{LineItem, cart_total};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ClientError;
use crate::storage::{StorageDir, keys};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn parse_items(raw: Option<String>) -> Vec<LineItem> {
    raw.and_then(|r| serde_json::from_str(&r).ok())
        .unwrap_or_default()
}

/// The cart: a list of line items in most-recent-first order, mirrored to
/// disk.
pub struct CartStore {
    items: Arc<Mutex<Vec<LineItem>>>,
    storage: StorageDir,
    /// Serialized form of our own last write, used to tell our writes
    /// apart from external ones in the watcher callback.
    last_written: Arc<Mutex<Option<String>>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl CartStore {
    /// Open the cart backed by `storage`, adopting the persisted list.
    ///
    /// A missing or unparseable cart file yields an empty cart; storage
    /// failures are swallowed, not propagated.
    #[must_use]
    pub fn open(storage: StorageDir) -> Self {
        let items = parse_items(storage.get(keys::CART));
        debug!(count = items.len(), "Loaded cart");
        Self {
            items: Arc::new(Mutex::new(items)),
            storage,
            last_written: Arc::new(Mutex::new(None)),
            watcher: Mutex::new(None),
        }
    }

    /// Snapshot of the current items, most recent first.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        lock(&self.items).clone()
    }

    /// Number of items in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }

    /// Grand total over all line items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        cart_total(&lock(&self.items))
    }

    /// Prepend a new item (most-recent-first ordering) and persist.
    pub fn add_item(&self, item: LineItem) {
        let mut items = lock(&self.items);
        items.insert(0, item);
        self.persist(&items);
    }

    /// Replace the item whose `id` matches; a no-op when there is no
    /// match. Returns whether a replacement happened.
    pub fn edit_item(&self, item: LineItem) -> bool {
        let mut items = lock(&self.items);
        let Some(slot) = items.iter_mut().find(|i| i.id == item.id) else {
            return false;
        };
        *slot = item;
        self.persist(&items);
        true
    }

    /// Remove the item with the given `id`. Returns whether it was present.
    pub fn delete_item(&self, id: Uuid) -> bool {
        let mut items = lock(&self.items);
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            return false;
        }
        self.persist(&items);
        true
    }

    /// Empty the cart and persist the empty list immediately, so the clear
    /// is durable even if the process terminates right after.
    pub fn clear(&self) {
        let mut items = lock(&self.items);
        items.clear();
        self.persist(&items);
    }

    fn persist(&self, items: &[LineItem]) {
        match serde_json::to_string(items) {
            Ok(raw) => {
                *lock(&self.last_written) = Some(raw.clone());
                self.storage.put(keys::CART, &raw);
            }
            Err(e) => warn!(error = %e, "Could not serialize cart"),
        }
    }

    /// Subscribe to file-change notifications for the cart cell. On an
    /// external change the in-memory list is replaced with the new value
    /// (or emptied when the file is gone), without re-persisting.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Watch`] when the watcher cannot be installed.
    pub fn watch(&self) -> Result<(), ClientError> {
        // The watched directory must exist before notify can attach to it.
        let _ = std::fs::create_dir_all(self.storage.dir());

        let items = Arc::clone(&self.items);
        let last_written = Arc::clone(&self.last_written);
        let storage = self.storage.clone();
        let cart_path = storage.path(keys::CART);

        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if !event.paths.iter().any(|p| p == &cart_path) {
                        return;
                    }
                    adopt_external(&items, &last_written, storage.get(keys::CART));
                }
                Err(e) => {
                    warn!(error = %e, "Cart watcher error");
                }
            })?;

        watcher.watch(self.storage.dir(), RecursiveMode::NonRecursive)?;
        *lock(&self.watcher) = Some(watcher);
        debug!(dir = %self.storage.dir().display(), "Watching cart for external changes");
        Ok(())
    }

    /// Stop watching for external changes.
    pub fn unwatch(&self) {
        *lock(&self.watcher) = None;
    }
}

/// Reconcile an out-of-band change to the cart cell: adopt the new value
/// as-is, skipping the echo of our own last write.
fn adopt_external(
    items: &Arc<Mutex<Vec<LineItem>>>,
    last_written: &Arc<Mutex<Option<String>>>,
    raw: Option<String>,
) {
    if raw.is_some() && raw.as_deref() == lock(last_written).as_deref() {
        return;
    }
    let next = parse_items(raw);
    debug!(count = next.len(), "Adopted external cart change");
    *lock(items) = next;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn temp_storage() -> (tempfile::TempDir, StorageDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(dir.path().to_path_buf());
        (dir, storage)
    }

    fn milk() -> LineItem {
        LineItem::new("Milk", 2, price(89)).unwrap()
    }

    fn bread() -> LineItem {
        LineItem::new("Bread", 1, price(149)).unwrap()
    }

    /// Round-trip law: after every mutation, a fresh store over the same
    /// storage reproduces the exact in-memory list.
    #[test]
    fn test_persisted_state_reproduces_in_memory_list() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage.clone());

        let a = milk();
        let b = bread();

        cart.add_item(a.clone());
        assert_eq!(CartStore::open(storage.clone()).items(), cart.items());

        cart.add_item(b.clone());
        assert_eq!(CartStore::open(storage.clone()).items(), cart.items());

        let edited = LineItem::with_id(a.id, "Oat milk", 3, price(119)).unwrap();
        cart.edit_item(edited);
        assert_eq!(CartStore::open(storage.clone()).items(), cart.items());

        cart.delete_item(b.id);
        assert_eq!(CartStore::open(storage.clone()).items(), cart.items());

        cart.clear();
        assert_eq!(CartStore::open(storage.clone()).items(), cart.items());
    }

    #[test]
    fn test_add_prepends() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage);

        cart.add_item(milk());
        cart.add_item(bread());

        let items = cart.items();
        assert_eq!(items[0].item_name, "Bread");
        assert_eq!(items[1].item_name, "Milk");
    }

    #[test]
    fn test_clear_is_durable_immediately() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage.clone());

        cart.add_item(milk());
        cart.clear();

        assert_eq!(storage.get(keys::CART).as_deref(), Some("[]"));
        assert!(CartStore::open(storage).is_empty());
    }

    #[test]
    fn test_edit_unknown_id_is_noop() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage);

        cart.add_item(milk());
        let before = cart.items();

        let stranger = bread();
        assert!(!cart.edit_item(stranger));
        assert_eq!(cart.items(), before);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage);

        cart.add_item(milk());
        assert!(!cart.delete_item(Uuid::new_v4()));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_corrupt_cart_file_loads_empty() {
        let (_guard, storage) = temp_storage();
        storage.put(keys::CART, "{not an array");
        assert!(CartStore::open(storage).is_empty());
    }

    #[test]
    fn test_totals() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage);

        cart.add_item(milk());
        assert_eq!(cart.total(), price(178));

        cart.add_item(bread());
        assert_eq!(cart.total(), price(327));
    }

    #[test]
    fn test_adopt_external_replaces_list_without_persisting() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage.clone());
        cart.add_item(milk());

        let external = vec![bread()];
        let raw = serde_json::to_string(&external).unwrap();
        adopt_external(&cart.items, &cart.last_written, Some(raw.clone()));

        assert_eq!(cart.items(), external);
        // The adopted value was not echoed back to storage.
        assert_ne!(storage.get(keys::CART).as_deref(), Some(raw.as_str()));
    }

    #[test]
    fn test_adopt_external_skips_own_write() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage.clone());
        cart.add_item(milk());

        let own = storage.get(keys::CART);
        let before = cart.items();
        adopt_external(&cart.items, &cart.last_written, own);
        assert_eq!(cart.items(), before);
    }

    #[test]
    fn test_adopt_external_missing_value_empties_cart() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage);
        cart.add_item(milk());

        adopt_external(&cart.items, &cart.last_written, None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_adopt_external_unparseable_value_empties_cart() {
        let (_guard, storage) = temp_storage();
        let cart = CartStore::open(storage);
        cart.add_item(milk());

        adopt_external(&cart.items, &cart.last_written, Some("garbage".to_owned()));
        assert!(cart.is_empty());
    }
}
