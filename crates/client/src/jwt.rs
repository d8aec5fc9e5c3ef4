//! Unverified JWT payload inspection.
//!
//! The client never validates token signatures; it only peeks at the
//! payload to derive a user identity when the backend did not return one.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Claims the client cares about.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Claims {
    pub user_id: Option<i32>,
    pub sub: Option<serde_json::Value>,
    pub email: Option<String>,
}

impl Claims {
    /// The user ID carried by the payload: `user_id`, or a numeric `sub`.
    pub fn user_id(&self) -> Option<i32> {
        if let Some(id) = self.user_id {
            return Some(id);
        }
        match &self.sub {
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            _ => None,
        }
    }
}

/// Decode the payload segment of a compact JWT, or `None` when the token
/// is not decodable. Signature and expiry are NOT checked.
pub(crate) fn decode_claims(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"HS256\",\"typ\":\"JWT\"}");
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn test_decode_user_id_claim() {
        let token = token_with_payload(&serde_json::json!({ "user_id": 7 }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
    }

    #[test]
    fn test_decode_numeric_sub() {
        let token = token_with_payload(&serde_json::json!({ "sub": "42" }));
        assert_eq!(decode_claims(&token).unwrap().user_id(), Some(42));

        let token = token_with_payload(&serde_json::json!({ "sub": 42 }));
        assert_eq!(decode_claims(&token).unwrap().user_id(), Some(42));
    }

    #[test]
    fn test_non_numeric_sub_yields_no_id() {
        let token = token_with_payload(&serde_json::json!({ "sub": "ada" }));
        assert_eq!(decode_claims(&token).unwrap().user_id(), None);
    }

    #[test]
    fn test_garbage_token() {
        assert!(decode_claims("not-a-jwt").is_none());
        assert!(decode_claims("a.!!!.c").is_none());
        assert!(decode_claims("").is_none());
    }

    #[test]
    fn test_email_claim() {
        let token =
            token_with_payload(&serde_json::json!({ "user_id": 1, "email": "a@b.c" }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@b.c"));
    }
}
