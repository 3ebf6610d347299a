//! Core types for Folio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod login;
pub mod phone;

pub use email::{Email, EmailError};
pub use id::*;
pub use login::{LoginIdentifier, LoginIdentifierError, PasscodeRoute};
pub use phone::{PhoneError, PhoneNumber};
