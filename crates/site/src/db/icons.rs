//! Captcha icon repository.

use sqlx::PgPool;

use folio_core::IconId;

use super::{IconStore, RepositoryError};
use crate::captcha::CaptchaIcon;

#[derive(Debug, sqlx::FromRow)]
struct IconRow {
    id: i32,
    icon: String,
    name: String,
    colour: String,
}

impl From<IconRow> for CaptchaIcon {
    fn from(row: IconRow) -> Self {
        Self {
            icon_id: IconId::new(row.id),
            icon: row.icon,
            name: row.name,
            colour: row.colour,
        }
    }
}

/// Repository for captcha icons.
#[derive(Clone, Copy)]
pub struct IconRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IconRepository<'a> {
    /// Create a new icon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All icons ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<CaptchaIcon>, RepositoryError> {
        let rows = sqlx::query_as::<_, IconRow>(
            "SELECT id, icon, name, colour FROM captcha_icon ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CaptchaIcon::from).collect())
    }

    /// Insert an icon, or update the markup and colour of the icon with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        icon: &str,
        name: &str,
        colour: &str,
    ) -> Result<CaptchaIcon, RepositoryError> {
        let row = sqlx::query_as::<_, IconRow>(
            r"
            INSERT INTO captcha_icon (icon, name, colour)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
                SET icon = EXCLUDED.icon, colour = EXCLUDED.colour
            RETURNING id, icon, name, colour
            ",
        )
        .bind(icon)
        .bind(name)
        .bind(colour)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}

impl IconStore for IconRepository<'_> {
    async fn random_icons(&self, quantity: usize) -> Result<Vec<CaptchaIcon>, RepositoryError> {
        let limit = i64::try_from(quantity).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, IconRow>(
            "SELECT id, icon, name, colour FROM captcha_icon ORDER BY random() LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CaptchaIcon::from).collect())
    }
}
