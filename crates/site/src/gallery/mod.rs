//! Photo search: term parsing and strategy resolution.

pub mod resolver;
pub mod terms;

pub use resolver::{
    ALL_ALBUMS, MOST_POPULAR, PhotoSearchResolver, SearchOutcome, SearchStrategy,
    normalize_album_name,
};
pub use terms::SearchTerms;
