//! Captcha icon commands.
//!
//! The seed file is a YAML list:
//!
//! ```yaml
//! - name: anchor
//!   icon: fa-anchor
//!   colour: navy
//! - name: heart
//!   icon: fa-heart
//!   colour: red
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use folio_site::captcha::MIN_ICONS;
use folio_site::db::{IconRepository, RepositoryError};

use super::{CommandError, connect};

/// Errors that can occur in icon commands.
#[derive(Debug, Error)]
pub enum IconError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid icon list: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One icon in the seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IconSeed {
    pub name: String,
    pub icon: String,
    pub colour: String,
}

/// Parse and check a seed file's contents.
fn parse_seed(content: &str) -> Result<Vec<IconSeed>, IconError> {
    let icons: Vec<IconSeed> = serde_yaml::from_str(content)?;

    let mut names = HashSet::new();
    for (index, icon) in icons.iter().enumerate() {
        if icon.name.trim().is_empty()
            || icon.icon.trim().is_empty()
            || icon.colour.trim().is_empty()
        {
            return Err(IconError::Invalid(format!("entry {index} has a blank field")));
        }
        if !names.insert(icon.name.trim()) {
            return Err(IconError::Invalid(format!("duplicate name '{}'", icon.name.trim())));
        }
    }

    if icons.len() < MIN_ICONS {
        return Err(IconError::Invalid(format!(
            "need at least {MIN_ICONS} icons for a captcha, found {}",
            icons.len()
        )));
    }

    Ok(icons)
}

/// Insert or update icons from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or a database
/// operation fails.
pub async fn seed(file_path: &str) -> Result<usize, IconError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(IconError::FileNotFound(file_path.to_owned()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let icons = parse_seed(&content)?;
    tracing::info!(icons = icons.len(), "Parsed icon file");

    let pool = connect().await?;
    let repo = IconRepository::new(&pool);
    for icon in &icons {
        let saved = repo
            .upsert(icon.icon.trim(), icon.name.trim(), icon.colour.trim())
            .await?;
        tracing::info!(id = %saved.icon_id, name = %saved.name, "Icon saved");
    }

    tracing::info!("Seeded {} icons", icons.len());
    Ok(icons.len())
}

/// List all icons.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), IconError> {
    let pool = connect().await?;
    let icons = IconRepository::new(&pool).list_all().await?;

    for icon in &icons {
        tracing::info!("{:>4}  {:<16} {:<12} {}", icon.icon_id, icon.name, icon.colour, icon.icon);
    }
    tracing::info!("{} icons", icons.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VALID: &str = r"
- name: anchor
  icon: fa-anchor
  colour: navy
- name: heart
  icon: fa-heart
  colour: red
- name: star
  icon: fa-star
  colour: gold
";

    #[test]
    fn test_parse_seed_valid() {
        let icons = parse_seed(VALID).unwrap();
        assert_eq!(icons.len(), 3);
        assert_eq!(icons[1].name, "heart");
    }

    #[test]
    fn test_parse_seed_rejects_duplicates() {
        let content = format!("{VALID}- name: star\n  icon: fa-star-o\n  colour: grey\n");
        assert!(matches!(parse_seed(&content), Err(IconError::Invalid(_))));
    }

    #[test]
    fn test_parse_seed_rejects_blank_fields() {
        let content = VALID.replace("colour: red", "colour: ' '");
        assert!(matches!(parse_seed(&content), Err(IconError::Invalid(_))));
    }

    #[test]
    fn test_parse_seed_needs_enough_icons() {
        let content = "- name: anchor\n  icon: fa-anchor\n  colour: navy\n";
        assert!(matches!(parse_seed(content), Err(IconError::Invalid(_))));
    }

    #[test]
    fn test_parse_seed_rejects_malformed_yaml() {
        assert!(matches!(parse_seed("- name: [unterminated"), Err(IconError::Yaml(_))));
    }

    #[test]
    fn test_shipped_seed_file_is_valid() {
        let content = include_str!("../../seeds/captcha_icons.yaml");
        assert!(parse_seed(content).unwrap().len() >= MIN_ICONS);
    }
}
