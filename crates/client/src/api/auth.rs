//! Authentication endpoints: login, Google sign-in, registration.

use anycart_core::{Email, User, UserId};
use serde::Deserialize;
use serde_json::json;

use crate::error::ClientError;
use crate::http::{ApiClient, Auth};
use crate::session::Session;

const LOGIN_PATH: &str = "/api/token/";
const GOOGLE_PATH: &str = "/api/auth/google/";
const REGISTER_PATH: &str = "/api/users/";

/// Body of a registration request.
#[derive(Debug, Clone)]
pub struct RegisterPayload {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address, validated client-side before any network call.
    pub email: Email,
    /// Password.
    pub password: String,
    /// Password confirmation, when the backend variant wants one.
    pub password2: Option<String>,
}

#[derive(Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Deserialize)]
struct BackendUser {
    id: UserId,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct BackendTokens {
    access: String,
    refresh: String,
    #[serde(default)]
    user: Option<BackendUser>,
}

#[derive(Deserialize)]
struct RegisterResponse {
    id: UserId,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    email: String,
    access: String,
    refresh: String,
}

fn normalize_user(raw: BackendUser) -> User {
    User {
        id: raw.id,
        email: Email::parse(&raw.email).ok(),
        name: raw.name.filter(|n| !n.is_empty()),
    }
}

fn join_names(first: &str, last: &str) -> Option<String> {
    let name = [first, last]
        .iter()
        .copied()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}

impl ApiClient {
    /// Obtain tokens with username and password.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error on bad credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let raw: TokenPair = self
            .post_json(
                LOGIN_PATH,
                json!({ "username": username, "password": password }),
                Auth::Public,
            )
            .await?;
        Ok(Session::from_tokens(raw.access, raw.refresh))
    }

    /// Exchange a Google ID token for backend tokens.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error when the exchange is
    /// rejected.
    pub async fn login_with_google(&self, id_token: &str) -> Result<Session, ClientError> {
        // Backend variants disagree on the field name; send both spellings.
        let raw: BackendTokens = self
            .post_json(
                GOOGLE_PATH,
                json!({ "id_token": id_token, "credential": id_token }),
                Auth::Public,
            )
            .await?;
        Ok(Session {
            access: raw.access,
            refresh: raw.refresh,
            user: raw.user.map(normalize_user),
        })
    }

    /// Register a new account. Returns a ready session: the backend signs
    /// the new user in as part of registration.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error on validation problems
    /// (e.g. an already-registered email).
    pub async fn register(&self, payload: &RegisterPayload) -> Result<Session, ClientError> {
        let mut body = json!({
            "first_name": payload.first_name,
            "last_name": payload.last_name,
            "email": payload.email.as_str(),
            "password": payload.password,
        });
        if let (Some(map), Some(password2)) = (body.as_object_mut(), &payload.password2) {
            map.insert("password2".to_owned(), json!(password2));
        }

        let raw: RegisterResponse = self.post_json(REGISTER_PATH, body, Auth::Public).await?;

        let user = User {
            id: raw.id,
            email: Email::parse(&raw.email).ok(),
            name: join_names(&raw.first_name, &raw.last_name),
        };
        Ok(Session {
            access: raw.access,
            refresh: raw.refresh,
            user: Some(user),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_join_names() {
        assert_eq!(join_names("Ada", "Lovelace").as_deref(), Some("Ada Lovelace"));
        assert_eq!(join_names("Ada", "").as_deref(), Some("Ada"));
        assert_eq!(join_names("", ""), None);
    }

    #[test]
    fn test_normalize_user_drops_bad_email() {
        let user = normalize_user(BackendUser {
            id: UserId::new(1),
            email: "not-an-email".to_owned(),
            name: Some(String::new()),
        });
        assert_eq!(user.email, None);
        assert_eq!(user.name, None);
    }
}
