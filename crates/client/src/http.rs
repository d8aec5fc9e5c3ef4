//! Authenticated request client.
//!
//! Wraps outgoing HTTP calls, attaches the bearer token, and on an
//! authorization failure performs a one-shot refresh-and-retry:
//!
//! 1. resolve the full URL against the configured base
//! 2. attach `Authorization: Bearer <access>` when auth is requested and a
//!    session exists; default the content type to JSON unless the body is
//!    multipart
//! 3. issue the request
//! 4. on 401 with auth requested: refresh the access token exactly once
//!    and, if a new token was obtained, reissue the identical request once
//! 5. non-success responses become [`ClientError::Status`] carrying the
//!    status, resolved URL and body text
//!
//! Dropping the returned future cancels the in-flight call; the refresh
//! path cannot run for a cancelled request.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionStore;

/// Fixed endpoint the refresh sub-operation POSTs to.
const REFRESH_PATH: &str = "/api/token/refresh/";

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Anonymous request.
    Public,
    /// Attach `Authorization: Bearer <access>` and recover from a 401 by
    /// refreshing the access token once.
    Bearer,
}

/// A request body that can be re-materialized, so the 401 retry reissues
/// the identical request.
#[derive(Debug, Clone)]
pub enum Body {
    /// No payload. The content type still defaults to JSON, matching what
    /// callers of the backend expect on bodyless POSTs.
    Empty,
    /// JSON payload.
    Json(serde_json::Value),
    /// Multipart form payload. No default content type; reqwest sets the
    /// multipart boundary header itself.
    Form(Vec<FormField>),
}

/// One field of a multipart form body.
#[derive(Debug, Clone)]
pub enum FormField {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File upload field, held in memory so retries can resend it.
    File {
        /// Field name.
        name: String,
        /// Original file name.
        filename: String,
        /// File contents.
        bytes: Vec<u8>,
    },
}

fn build_form(fields: &[FormField]) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name.clone(), value.clone()),
            FormField::File {
                name,
                filename,
                bytes,
            } => form.part(
                name.clone(),
                reqwest::multipart::Part::bytes(bytes.clone()).file_name(filename.clone()),
            ),
        };
    }
    form
}

#[derive(serde::Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// HTTP client for the backend, aware of the session store.
///
/// Cheap to share behind a reference; all methods take `&self`.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    /// Coalesces concurrent refresh attempts into one network call.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl ApiClient {
    /// Create a client from configuration and a session store.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: config.api_base.clone(),
            session,
            refresh_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// The session store this client reads tokens from.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_owned()
        } else {
            format!("{}{path}", self.base_url)
        }
    }

    /// Issue a request and return the (possibly retried) raw response.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        auth: Auth,
        body: &Body,
        extra_headers: &[(&'static str, String)],
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.resolve_url(path);
        let bearer = match auth {
            Auth::Bearer => self.session.get().map(|s| s.access),
            Auth::Public => None,
        };

        let response = self
            .send_once(&method, &url, bearer.as_deref(), body, extra_headers)
            .await?;

        if auth == Auth::Bearer && response.status() == StatusCode::UNAUTHORIZED {
            if let Some(access) = self.refresh_access_token(bearer.as_deref()).await {
                debug!(%url, "Retrying request with refreshed access token");
                return self
                    .send_once(&method, &url, Some(&access), body, extra_headers)
                    .await;
            }
        }

        Ok(response)
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        bearer: Option<&str>,
        body: &Body,
        extra_headers: &[(&'static str, String)],
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request = match body {
            Body::Empty => request.header(CONTENT_TYPE, "application/json"),
            Body::Json(value) => request.json(value),
            Body::Form(fields) => request.multipart(build_form(fields)),
        };
        for (name, value) in extra_headers {
            request = request.header(*name, value.as_str());
        }
        Ok(request.send().await?)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Returns the new token on success, `None` on any failure — refresh
    /// failures are never escalated, the caller falls back to the original
    /// 401. With no refresh token at hand this fails immediately, without
    /// a network call.
    ///
    /// Concurrent 401s coalesce: whoever wins the lock performs the
    /// network call, later waiters observe the already-updated session and
    /// reuse its token.
    async fn refresh_access_token(&self, stale_access: Option<&str>) -> Option<String> {
        let _guard = self.refresh_lock.lock().await;

        let session = self.session.get()?;
        // Another request may have refreshed while we waited for the lock.
        if stale_access.is_some() && stale_access != Some(session.access.as_str()) {
            debug!("Reusing access token refreshed by a concurrent request");
            return Some(session.access);
        }
        if session.refresh.is_empty() {
            return None;
        }

        let url = self.resolve_url(REFRESH_PATH);
        let response = match self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&RefreshRequest {
                refresh: &session.refresh,
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh rejected");
            return None;
        }

        let parsed: RefreshResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Token refresh response unreadable");
                return None;
            }
        };

        self.session.set_access(&parsed.access);
        debug!("Access token refreshed");
        Some(parsed.access)
    }

    /// GET `path` and parse the JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path, auth, &Body::Empty, &[]).await?;
        Self::into_json(response).await
    }

    /// POST a JSON body to `path` and parse the JSON response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
        auth: Auth,
    ) -> Result<T, ClientError> {
        self.post_json_with_headers(path, body, auth, &[]).await
    }

    /// POST a JSON body with additional headers (e.g. `Idempotency-Key`).
    pub async fn post_json_with_headers<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
        auth: Auth,
        extra_headers: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .request(Method::POST, path, auth, &Body::Json(body), extra_headers)
            .await?;
        Self::into_json(response).await
    }

    /// POST without a payload and parse the JSON response.
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::POST, path, auth, &Body::Empty, &[]).await?;
        Self::into_json(response).await
    }

    /// PATCH a multipart form to `path` and parse the JSON response.
    pub async fn patch_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: Vec<FormField>,
        auth: Auth,
    ) -> Result<T, ClientError> {
        let response = self
            .request(Method::PATCH, path, auth, &Body::Form(fields), &[])
            .await?;
        Self::into_json(response).await
    }

    /// DELETE `path`, accepting an empty (204) response.
    pub async fn delete(&self, path: &str, auth: Auth) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, path, auth, &Body::Empty, &[])
            .await?;
        Self::check_status(response).await.map(drop)
    }

    async fn into_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::check_status(response).await?;
        let raw = response.text().await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        // Best-effort body read; a secondary read failure is swallowed.
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, url, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::StorageDir;

    fn test_client() -> (tempfile::TempDir, ApiClient) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(dir.path().to_path_buf());
        let config = ClientConfig {
            api_base: "http://127.0.0.1:8000".to_owned(),
            google_client_id: None,
            data_dir: dir.path().to_path_buf(),
        };
        let client = ApiClient::new(&config, SessionStore::new(storage)).unwrap();
        (dir, client)
    }

    #[test]
    fn test_resolve_relative_path() {
        let (_guard, client) = test_client();
        assert_eq!(
            client.resolve_url("/api/purchases/"),
            "http://127.0.0.1:8000/api/purchases/"
        );
    }

    #[test]
    fn test_resolve_absolute_url_passthrough() {
        let (_guard, client) = test_client();
        assert_eq!(
            client.resolve_url("https://elsewhere.example.com/x"),
            "https://elsewhere.example.com/x"
        );
    }
}
