//! Cross-process cart reconciliation through the file watcher.
//!
//! Run with: `cargo test -p anycart-integration-tests`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use anycart_client::{CartStore, StorageDir};
use anycart_core::LineItem;
use anycart_integration_tests::wait_until;
use rust_decimal::Decimal;

fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[tokio::test]
async fn a_watching_cart_adopts_writes_from_another_store() {
    let data_dir = tempfile::tempdir().unwrap();
    let storage = StorageDir::new(data_dir.path().to_path_buf());

    let ours = CartStore::open(storage.clone());
    ours.watch().expect("watcher should install");

    // Another store over the same directory, as another process would use.
    let theirs = CartStore::open(storage.clone());
    theirs.add_item(LineItem::new("Milk", 2, price(89)).unwrap());

    let synced = wait_until(Duration::from_secs(5), || ours.len() == 1).await;
    assert!(synced, "watcher never adopted the external write");
    assert_eq!(ours.items()[0].item_name, "Milk");
    assert_eq!(ours.total(), price(178));
}

#[tokio::test]
async fn an_external_clear_empties_the_watching_cart() {
    let data_dir = tempfile::tempdir().unwrap();
    let storage = StorageDir::new(data_dir.path().to_path_buf());

    let ours = CartStore::open(storage.clone());
    ours.add_item(LineItem::new("Milk", 2, price(89)).unwrap());
    ours.watch().expect("watcher should install");

    let theirs = CartStore::open(storage.clone());
    assert_eq!(theirs.len(), 1);
    theirs.clear();

    let synced = wait_until(Duration::from_secs(5), || ours.is_empty()).await;
    assert!(synced, "watcher never adopted the external clear");
}
