//! Folio Core - Shared domain types.
//!
//! This crate provides the types used across all Folio components:
//! - `site` - The public photo website (gallery, contact form, login)
//! - `cli` - Command-line tools for migrations and captcha icon seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, phone numbers and login identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
