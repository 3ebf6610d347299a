//! User repository.
//!
//! Login state (codes, attempt counter, login date) lives on the user row;
//! there is no separate token table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{Email, LoginIdentifier, PasscodeRoute, PhoneNumber, UserId};

use super::{RepositoryError, UserStore, map_constraint_error};
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    phone: Option<String>,
    display_name: String,
    passcode_route: PasscodeRoute,
    magic_link: Option<String>,
    phone_code: Option<String>,
    login_attempts: i32,
    login_date: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = row
            .phone
            .as_deref()
            .map(PhoneNumber::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            phone,
            display_name: row.display_name,
            passcode_route: row.passcode_route,
            magic_link: row.magic_link,
            phone_code: row.phone_code,
            login_attempts: row.login_attempts,
            login_date: row.login_date,
        })
    }
}

/// Repository for user database operations.
#[derive(Clone, Copy)]
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        phone: Option<&PhoneNumber>,
        display_name: &str,
        passcode_route: PasscodeRoute,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO site_user (email, phone, display_name, passcode_route)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, phone, display_name, passcode_route,
                      magic_link, phone_code, login_attempts, login_date
            ",
        )
        .bind(email)
        .bind(phone)
        .bind(display_name)
        .bind(passcode_route)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "email or phone already registered"))?;

        row.try_into()
    }
}

impl UserStore for UserRepository<'_> {
    async fn find_by_magic_link(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, phone, display_name, passcode_route,
                   magic_link, phone_code, login_attempts, login_date
            FROM site_user
            WHERE magic_link = $1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_login(
        &self,
        login: &LoginIdentifier,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = match login {
            LoginIdentifier::Email(_) => {
                r"
                SELECT id, email, phone, display_name, passcode_route,
                       magic_link, phone_code, login_attempts, login_date
                FROM site_user
                WHERE email = $1
                "
            }
            LoginIdentifier::Phone(_) => {
                r"
                SELECT id, email, phone, display_name, passcode_route,
                       magic_link, phone_code, login_attempts, login_date
                FROM site_user
                WHERE phone = $1
                "
            }
        };

        let row = sqlx::query_as::<_, UserRow>(sql)
            .bind(login.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn save_login_details(&self, user: &User) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE site_user
            SET magic_link = $1,
                phone_code = $2,
                login_attempts = $3,
                login_date = $4
            WHERE id = $5
            ",
        )
        .bind(user.magic_link.as_deref())
        .bind(user.phone_code.as_deref())
        .bind(user.login_attempts)
        .bind(user.login_date)
        .bind(user.id)
        .execute(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "magic link already in use"))?;

        Ok(result.rows_affected() > 0)
    }
}
