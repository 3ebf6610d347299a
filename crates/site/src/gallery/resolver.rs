//! Photo search resolution.
//!
//! An album name and free-text terms map to exactly one retrieval strategy.
//! Rules are tried in order and the first match wins:
//!
//! | # | album resolves | name            | tokens    | strategy         |
//! |---|----------------|-----------------|-----------|------------------|
//! | 1 | yes            | -               | none      | `AlbumListing`   |
//! | 2 | yes            | -               | some      | `AlbumSearch`    |
//! | 3 | no             | `most-popular`  | ignored   | `TopPhotos`      |
//! | 4 | no             | -               | some      | `GlobalSearch`   |
//! | 5 | no             | -               | none      | `Random`         |

use serde::Serialize;
use tracing::instrument;

use super::terms::SearchTerms;
use crate::db::{AlbumStore, PhotoStore, RepositoryError};
use crate::models::{Photo, PhotoAlbum};

/// Album name meaning "no particular album". Never looked up.
pub const ALL_ALBUMS: &str = "all";

/// Reserved non-album name selecting the popularity listing.
pub const MOST_POPULAR: &str = "most-popular";

/// The retrieval strategy chosen for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Every photo of a known album.
    AlbumListing,
    /// Token search restricted to a known album.
    AlbumSearch,
    /// Photos ranked by views.
    TopPhotos,
    /// Token search across all photos.
    GlobalSearch,
    /// A random selection, the default browsing view.
    Random,
}

impl SearchStrategy {
    /// Pick the strategy for an already attempted album lookup.
    ///
    /// `album_name` is the normalized name (see [`normalize_album_name`]).
    /// Tokens are ignored by the reserved `most-popular` keyword.
    #[must_use]
    pub fn decide(album_found: bool, album_name: Option<&str>, terms: &SearchTerms) -> Self {
        match (album_found, terms.is_empty()) {
            (true, true) => Self::AlbumListing,
            (true, false) => Self::AlbumSearch,
            (false, _) if album_name == Some(MOST_POPULAR) => Self::TopPhotos,
            (false, false) => Self::GlobalSearch,
            (false, true) => Self::Random,
        }
    }
}

/// URL-decode and trim an album name. Blank names become `None`.
///
/// Invalid percent-encoding leaves the input as typed.
#[must_use]
pub fn normalize_album_name(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), |d| d.into_owned());
    let trimmed = decoded.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Whether an album name should be looked up at all.
fn is_album_candidate(name: &str) -> bool {
    name != ALL_ALBUMS
}

/// Result of resolving a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A known album with its photos attached.
    Album {
        strategy: SearchStrategy,
        album: PhotoAlbum,
    },
    /// A flat photo collection.
    Photos {
        strategy: SearchStrategy,
        photos: Vec<Photo>,
    },
}

impl SearchOutcome {
    /// The strategy that produced this outcome.
    #[must_use]
    pub const fn strategy(&self) -> SearchStrategy {
        match self {
            Self::Album { strategy, .. } | Self::Photos { strategy, .. } => *strategy,
        }
    }

    /// The photos, wherever they are attached.
    #[must_use]
    pub fn photos(&self) -> &[Photo] {
        match self {
            Self::Album { album, .. } => &album.photos,
            Self::Photos { photos, .. } => photos,
        }
    }
}

/// Resolves searches against album and photo stores.
pub struct PhotoSearchResolver<A, P> {
    albums: A,
    photos: P,
}

impl<A: AlbumStore, P: PhotoStore> PhotoSearchResolver<A, P> {
    /// Create a resolver over the given stores.
    pub const fn new(albums: A, photos: P) -> Self {
        Self { albums, photos }
    }

    /// Resolve an album name and raw search text to photos.
    ///
    /// Makes at most one album lookup and exactly one photo fetch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a store fails. Unknown album names are
    /// not errors; they fall through to the non-album strategies.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        album: Option<&str>,
        terms: Option<&str>,
    ) -> Result<SearchOutcome, RepositoryError> {
        let name = normalize_album_name(album);
        let terms = SearchTerms::parse(terms);

        let found = match name.as_deref() {
            Some(name) if is_album_candidate(name) => self.albums.fetch_by_name(name).await?,
            _ => None,
        };

        let strategy = SearchStrategy::decide(found.is_some(), name.as_deref(), &terms);
        tracing::debug!(?strategy, tokens = terms.len(), "Resolved photo search");

        let outcome = match (strategy, found) {
            (SearchStrategy::AlbumListing, Some(album)) => {
                let photos = self.albums.fetch_album_photos(&album).await?;
                SearchOutcome::Album {
                    strategy,
                    album: album.with_photos(photos),
                }
            }
            (SearchStrategy::AlbumSearch, Some(album)) => {
                let photos = self.albums.search_album_photos(&album, &terms).await?;
                SearchOutcome::Album {
                    strategy,
                    album: album.with_photos(photos),
                }
            }
            (SearchStrategy::TopPhotos, _) => SearchOutcome::Photos {
                strategy,
                photos: self.photos.top_photos().await?,
            },
            (SearchStrategy::GlobalSearch, _) => SearchOutcome::Photos {
                strategy,
                photos: self.photos.search(&terms).await?,
            },
            // Random, or an album strategy without an album.
            _ => SearchOutcome::Photos {
                strategy: SearchStrategy::Random,
                photos: self.photos.random_selection().await?,
            },
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(raw: &str) -> SearchTerms {
        SearchTerms::parse(Some(raw))
    }

    #[test]
    fn test_found_album_without_tokens_lists_album() {
        assert_eq!(
            SearchStrategy::decide(true, Some("Singapore"), &terms("")),
            SearchStrategy::AlbumListing
        );
    }

    #[test]
    fn test_found_album_with_tokens_searches_album() {
        assert_eq!(
            SearchStrategy::decide(true, Some("Singapore"), &terms("sunset")),
            SearchStrategy::AlbumSearch
        );
    }

    #[test]
    fn test_most_popular_ignores_tokens() {
        assert_eq!(
            SearchStrategy::decide(false, Some(MOST_POPULAR), &terms("")),
            SearchStrategy::TopPhotos
        );
        assert_eq!(
            SearchStrategy::decide(false, Some(MOST_POPULAR), &terms("sunset")),
            SearchStrategy::TopPhotos
        );
    }

    #[test]
    fn test_real_album_named_most_popular_wins() {
        assert_eq!(
            SearchStrategy::decide(true, Some(MOST_POPULAR), &terms("")),
            SearchStrategy::AlbumListing
        );
    }

    #[test]
    fn test_unknown_album_with_tokens_searches_globally() {
        assert_eq!(
            SearchStrategy::decide(false, Some("Atlantis"), &terms("sunset")),
            SearchStrategy::GlobalSearch
        );
        assert_eq!(
            SearchStrategy::decide(false, None, &terms("sunset")),
            SearchStrategy::GlobalSearch
        );
    }

    #[test]
    fn test_fallback_is_random() {
        for name in [None, Some(ALL_ALBUMS), Some("Atlantis")] {
            assert_eq!(
                SearchStrategy::decide(false, name, &terms("")),
                SearchStrategy::Random
            );
        }
    }

    #[test]
    fn test_normalize_album_name() {
        assert_eq!(normalize_album_name(None), None);
        assert_eq!(normalize_album_name(Some("")), None);
        assert_eq!(normalize_album_name(Some("  %20 ")), None);
        assert_eq!(
            normalize_album_name(Some("New%20Zealand ")),
            Some("New Zealand".to_string())
        );
        assert_eq!(
            normalize_album_name(Some(" most-popular")),
            Some(MOST_POPULAR.to_string())
        );
    }

    #[test]
    fn test_all_is_never_an_album_candidate() {
        assert!(!is_album_candidate(ALL_ALBUMS));
        assert!(is_album_candidate("All"));
    }
}
