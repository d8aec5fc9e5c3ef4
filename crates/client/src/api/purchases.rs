//! Purchase endpoints: list, detail, create (checkout), delete.

use anycart_core::{NewPurchase, Purchase, PurchaseId, normalize_purchases};
use uuid::Uuid;

use crate::error::ClientError;
use crate::http::{ApiClient, Auth};

const PURCHASES_PATH: &str = "/api/purchases/";

fn purchase_path(id: &PurchaseId) -> String {
    format!("{PURCHASES_PATH}{}/", urlencoding::encode(id.as_str()))
}

impl ApiClient {
    /// List the current user's purchases, newest first as returned by the
    /// backend. Page envelopes and malformed records are normalized away.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error.
    pub async fn list_purchases(&self) -> Result<Vec<Purchase>, ClientError> {
        let raw: serde_json::Value = self.get_json(PURCHASES_PATH, Auth::Bearer).await?;
        Ok(normalize_purchases(raw))
    }

    /// Fetch one purchase, including its items.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error (404 for unknown IDs).
    pub async fn get_purchase(&self, id: &PurchaseId) -> Result<Purchase, ClientError> {
        self.get_json(&purchase_path(id), Auth::Bearer).await
    }

    /// Persist a completed cart as a purchase.
    ///
    /// A client-generated `Idempotency-Key` header makes retried
    /// submissions safe: the backend deduplicates on it.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error.
    pub async fn create_purchase(&self, purchase: &NewPurchase) -> Result<Purchase, ClientError> {
        let key = Uuid::new_v4().to_string();
        self.post_json_with_headers(
            PURCHASES_PATH,
            serde_json::to_value(purchase)?,
            Auth::Bearer,
            &[("Idempotency-Key", key)],
        )
        .await
    }

    /// Delete a purchase by ID. The backend answers 204.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error.
    pub async fn delete_purchase(&self, id: &PurchaseId) -> Result<(), ClientError> {
        self.delete(&purchase_path(id), Auth::Bearer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_path_encodes_id() {
        let id = PurchaseId::new("a/b c");
        assert_eq!(purchase_path(&id), "/api/purchases/a%2Fb%20c/");
    }
}
