//! User management commands.

use thiserror::Error;

use folio_core::{Email, EmailError, PasscodeRoute, PhoneError, PhoneNumber};
use folio_site::db::{RepositoryError, UserRepository};

use super::{CommandError, connect};

/// Errors that can occur while adding a user.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("Invalid route: {0}. Valid routes: email, phone")]
    InvalidRoute(String),

    #[error("Phone route needs a phone number")]
    MissingPhone,

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Database error: {0}")]
    Repository(RepositoryError),
}

/// Validated input for a new user.
#[derive(Debug, PartialEq, Eq)]
struct NewUser {
    email: Email,
    phone: Option<PhoneNumber>,
    route: PasscodeRoute,
}

fn validate(email: &str, phone: Option<&str>, route: &str) -> Result<NewUser, UserError> {
    let email = Email::parse(email)?;
    let phone = phone.map(PhoneNumber::parse).transpose()?;
    let route: PasscodeRoute = route
        .parse()
        .map_err(|_| UserError::InvalidRoute(route.to_owned()))?;

    if route == PasscodeRoute::Phone && phone.is_none() {
        return Err(UserError::MissingPhone);
    }

    Ok(NewUser {
        email,
        phone,
        route,
    })
}

/// Add a user who can log in with a magic link or phone code.
///
/// # Errors
///
/// Returns an error if the input is invalid, the user exists, or the
/// database is unreachable.
pub async fn add(
    email: &str,
    name: &str,
    phone: Option<&str>,
    route: &str,
) -> Result<(), UserError> {
    let new_user = validate(email, phone, route)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .create(
            &new_user.email,
            new_user.phone.as_ref(),
            name.trim(),
            new_user.route,
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(new_user.email.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!(
        "User created! ID: {}, Email: {}, Route: {}",
        user.id,
        user.email,
        user.passcode_route
    );
    Ok(())
}
