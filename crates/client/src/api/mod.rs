//! Typed wrappers for the backend endpoints.
//!
//! Request/response structs live next to the call that uses them; payloads
//! from the backend are normalized into the core types before they leave
//! this module.

mod auth;
mod purchases;
mod user;

pub use auth::RegisterPayload;
pub use user::{AvatarUpdate, ConfirmationSent, Me, UpdateMe};
