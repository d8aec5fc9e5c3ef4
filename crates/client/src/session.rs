//! Session storage: access/refresh tokens and the cached user.
//!
//! The session is exclusively owned by the [`SessionStore`]; the request
//! client only reads it and calls the narrow [`SessionStore::set_access`]
//! mutation from the token-refresh path.

use anycart_core::{Email, User, UserId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::jwt;
use crate::storage::{StorageDir, keys};

/// The current session: a pair of tokens plus an optional cached user.
///
/// Created on successful login/registration/Google sign-in, mutated in
/// place when the access token is refreshed, destroyed on logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived credential sent with each authenticated request.
    pub access: String,
    /// Longer-lived credential exchanged for a new access token.
    pub refresh: String,
    /// Cached user, when the backend returned one.
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    /// A session holding only tokens.
    #[must_use]
    pub const fn from_tokens(access: String, refresh: String) -> Self {
        Self {
            access,
            refresh,
            user: None,
        }
    }

    /// The user identity for this session: the cached user, or one derived
    /// from the access-token payload (`user_id`, or a numeric `sub`).
    /// `None` when the payload yields no usable identifier.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        if let Some(user) = &self.user {
            return Some(user.clone());
        }
        user_from_token(&self.access)
    }
}

/// Derive a [`User`] from an access-token payload.
#[must_use]
pub fn user_from_token(access: &str) -> Option<User> {
    let claims = jwt::decode_claims(access)?;
    let id = claims.user_id()?;
    Some(User {
        id: UserId::new(id),
        email: claims.email.as_deref().and_then(|e| Email::parse(e).ok()),
        name: None,
    })
}

/// Durable storage of the current session, one file per field.
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: StorageDir,
}

impl SessionStore {
    /// Create a store over `storage`.
    #[must_use]
    pub const fn new(storage: StorageDir) -> Self {
        Self { storage }
    }

    /// Read the current session. `None` when storage is unavailable or
    /// either token is missing.
    #[must_use]
    pub fn get(&self) -> Option<Session> {
        let access = self.storage.get(keys::ACCESS)?;
        let refresh = self.storage.get(keys::REFRESH)?;
        let user = self
            .storage
            .get(keys::USER)
            .and_then(|raw| serde_json::from_str(&raw).ok());
        Some(Session {
            access,
            refresh,
            user,
        })
    }

    /// Persist the whole session, best-effort.
    pub fn set(&self, session: &Session) {
        self.storage.put(keys::ACCESS, &session.access);
        self.storage.put(keys::REFRESH, &session.refresh);
        match serde_json::to_string(&session.user) {
            Ok(raw) => self.storage.put(keys::USER, &raw),
            Err(e) => debug!(error = %e, "Could not serialize session user"),
        }
    }

    /// Fill in the user from the token payload when the backend did not
    /// return one, then persist. Used by the login paths.
    pub fn establish(&self, mut session: Session) -> Session {
        if session.user.is_none() {
            session.user = user_from_token(&session.access);
        }
        self.set(&session);
        session
    }

    /// Remove all persisted fields. Used on logout.
    pub fn clear(&self) {
        self.storage.remove(keys::ACCESS);
        self.storage.remove(keys::REFRESH);
        self.storage.remove(keys::USER);
    }

    /// Update only the access token in place, preserving refresh and user.
    /// Used exclusively by the token-refresh path.
    pub fn set_access(&self, access: &str) {
        self.storage.put(keys::ACCESS, access);
    }

    /// The user identity of the stored session, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.get().and_then(|session| session.current_user())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(dir.path().to_path_buf());
        (dir, SessionStore::new(storage))
    }

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"HS256\"}");
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn test_get_requires_both_tokens() {
        let (_guard, store) = temp_store();
        assert!(store.get().is_none());

        store.set_access("a");
        // Access alone is not a session.
        assert!(store.get().is_none());
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let (_guard, store) = temp_store();
        let session = Session {
            access: "a".to_owned(),
            refresh: "r".to_owned(),
            user: Some(User {
                id: UserId::new(1),
                email: Some(Email::parse("ada@example.com").unwrap()),
                name: Some("Ada".to_owned()),
            }),
        };
        store.set(&session);
        assert_eq!(store.get().unwrap(), session);
    }

    #[test]
    fn test_set_access_preserves_refresh_and_user() {
        let (_guard, store) = temp_store();
        store.set(&Session::from_tokens("a".to_owned(), "r".to_owned()));
        store.set_access("a2");

        let session = store.get().unwrap();
        assert_eq!(session.access, "a2");
        assert_eq!(session.refresh, "r");
    }

    #[test]
    fn test_clear_removes_everything() {
        let (_guard, store) = temp_store();
        store.set(&Session::from_tokens("a".to_owned(), "r".to_owned()));
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_user_derived_from_token_payload() {
        let (_guard, store) = temp_store();
        let access = token_with_payload(&serde_json::json!({ "user_id": 9 }));
        store.set(&Session::from_tokens(access, "r".to_owned()));

        let user = store.current_user().unwrap();
        assert_eq!(user.id, UserId::new(9));
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_no_usable_claims_yields_no_user() {
        let (_guard, store) = temp_store();
        let access = token_with_payload(&serde_json::json!({ "scope": "all" }));
        store.set(&Session::from_tokens(access, "r".to_owned()));
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_establish_fills_user_from_token() {
        let (_guard, store) = temp_store();
        let access = token_with_payload(&serde_json::json!({ "sub": "5" }));
        let session = store.establish(Session::from_tokens(access, "r".to_owned()));

        assert_eq!(session.user.as_ref().unwrap().id, UserId::new(5));
        // And the filled-in user was persisted.
        assert_eq!(store.get().unwrap().user, session.user);
    }

    #[test]
    fn test_corrupt_cached_user_degrades_to_token_identity() {
        let (_guard, store) = temp_store();
        let access = token_with_payload(&serde_json::json!({ "user_id": 3 }));
        store.set(&Session::from_tokens(access, "r".to_owned()));

        let storage = StorageDir::new(store.storage.dir().to_path_buf());
        storage.put(keys::USER, "{not json");

        let user = store.current_user().unwrap();
        assert_eq!(user.id, UserId::new(3));
    }
}
