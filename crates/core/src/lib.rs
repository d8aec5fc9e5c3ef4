//! AnyCart Core - Shared types library.
//!
//! This crate provides common types used across all AnyCart components:
//! - `client` - Session storage, HTTP client, and API services
//! - `cli` - The `anycart` command-line frontend
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails and currencies, plus the
//!   cart and purchase domain types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
