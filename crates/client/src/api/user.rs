//! Current-user endpoints.

use anycart_core::{Email, User, UserId};
use serde::Deserialize;

use crate::error::ClientError;
use crate::http::{ApiClient, Auth, FormField};

const ME_PATH: &str = "/api/me/";
const SEND_CONFIRMATION_PATH: &str = "/api/auth/send-confirmation-email/";

/// The current user's profile as returned by `GET /api/me/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    /// Backend user ID.
    pub id: UserId,
    /// Email address.
    pub email: Email,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Avatar URL, when one was uploaded.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Whether the user has staff privileges.
    #[serde(default)]
    pub is_staff: bool,
    /// Whether the email address has been confirmed.
    #[serde(default)]
    pub email_confirmed: bool,
}

impl Me {
    /// First and last name joined, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .copied()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.as_str().to_owned()
        } else {
            name
        }
    }

    /// Convert into the core [`User`] identity.
    #[must_use]
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            email: Some(self.email.clone()),
            name: {
                let name = self.display_name();
                (name != self.email.as_str()).then_some(name)
            },
        }
    }
}

/// Profile update. Fields left as `None` are not touched.
#[derive(Debug, Clone, Default)]
pub struct UpdateMe {
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// Avatar change.
    pub avatar: Option<AvatarUpdate>,
}

/// Avatar mutation inside an [`UpdateMe`].
#[derive(Debug, Clone)]
pub enum AvatarUpdate {
    /// Upload a new avatar.
    Upload {
        /// Original file name.
        filename: String,
        /// File contents.
        bytes: Vec<u8>,
    },
    /// Remove the current avatar. The backend interprets an empty field as
    /// a clear.
    Clear,
}

impl UpdateMe {
    fn into_form_fields(self) -> Vec<FormField> {
        let mut fields = Vec::new();
        if let Some(first_name) = self.first_name {
            fields.push(FormField::Text {
                name: "first_name".to_owned(),
                value: first_name,
            });
        }
        if let Some(last_name) = self.last_name {
            fields.push(FormField::Text {
                name: "last_name".to_owned(),
                value: last_name,
            });
        }
        match self.avatar {
            Some(AvatarUpdate::Upload { filename, bytes }) => {
                fields.push(FormField::File {
                    name: "avatar".to_owned(),
                    filename,
                    bytes,
                });
            }
            Some(AvatarUpdate::Clear) => {
                fields.push(FormField::Text {
                    name: "avatar".to_owned(),
                    value: String::new(),
                });
            }
            None => {}
        }
        fields
    }
}

/// Response of the send-confirmation-email endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationSent {
    /// Human-readable status line from the backend.
    pub detail: String,
}

impl ApiClient {
    /// Fetch the current user's profile.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error; a surviving 401 means
    /// the session is invalid.
    pub async fn me(&self) -> Result<Me, ClientError> {
        self.get_json(ME_PATH, Auth::Bearer).await
    }

    /// Update the current user's profile via a multipart form.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error on validation problems.
    pub async fn update_me(&self, update: UpdateMe) -> Result<Me, ClientError> {
        self.patch_form(ME_PATH, update.into_form_fields(), Auth::Bearer)
            .await
    }

    /// Ask the backend to send a confirmation email to the current user.
    ///
    /// # Errors
    ///
    /// Fails with the backend's structured error.
    pub async fn send_confirmation_email(&self) -> Result<ConfirmationSent, ClientError> {
        self.post_empty(SEND_CONFIRMATION_PATH, Auth::Bearer).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn me() -> Me {
        Me {
            id: UserId::new(1),
            email: Email::parse("ada@example.com").unwrap(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            avatar_url: None,
            is_staff: false,
            email_confirmed: true,
        }
    }

    #[test]
    fn test_display_name_joins_parts() {
        assert_eq!(me().display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut profile = me();
        profile.first_name.clear();
        profile.last_name.clear();
        assert_eq!(profile.display_name(), "ada@example.com");
    }

    #[test]
    fn test_update_form_fields() {
        let update = UpdateMe {
            first_name: Some("Ada".to_owned()),
            last_name: None,
            avatar: Some(AvatarUpdate::Clear),
        };
        let fields = update.into_form_fields();
        assert_eq!(fields.len(), 2);
        assert!(matches!(
            &fields[1],
            FormField::Text { name, value } if name == "avatar" && value.is_empty()
        ));
    }
}
