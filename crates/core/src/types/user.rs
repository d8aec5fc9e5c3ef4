//! User identity as seen by the client.

use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::UserId;

/// The authenticated user.
///
/// `email` and `name` may be absent when the identity was derived from a
/// token payload rather than returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user ID.
    pub id: UserId,
    /// Email address, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// Display name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    /// A bare identity knowing only the user ID.
    #[must_use]
    pub const fn from_id(id: UserId) -> Self {
        Self {
            id,
            email: None,
            name: None,
        }
    }

    /// The best human-readable label for this user: name, then email,
    /// then the numeric ID.
    #[must_use]
    pub fn display_label(&self) -> String {
        if let Some(name) = &self.name
            && !name.is_empty()
        {
            return name.clone();
        }
        if let Some(email) = &self.email {
            return email.as_str().to_owned();
        }
        format!("user #{}", self.id)
    }
}
