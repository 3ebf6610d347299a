//! Newtype IDs for entity references.
//!
//! Every table keyed by a `SERIAL` column gets its own ID type so that a
//! photo ID can never be passed where an album ID is expected.

/// Define a newtype ID wrapper around `i32`.
///
/// The generated type is `Copy`, serializes transparently, parses from a
/// path segment via `FromStr`, and (with the `postgres` feature) encodes as
/// a plain `INTEGER` column.
///
/// # Example
///
/// ```rust
/// # use folio_core::define_id;
/// define_id!(TagId);
///
/// let tag: TagId = "42".parse().unwrap();
/// assert_eq!(tag.as_i32(), 42);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database ID.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw database ID.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(AlbumId);
define_id!(PhotoId);
define_id!(IconId);
define_id!(CommentId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_path_segment() {
        let id: PhotoId = " 17 ".parse().unwrap();
        assert_eq!(id, PhotoId::new(17));
        assert!("seventeen".parse::<PhotoId>().is_err());
    }

    #[test]
    fn test_serializes_transparently() {
        let json = serde_json::to_string(&AlbumId::new(3)).unwrap();
        assert_eq!(json, "3");

        let back: AlbumId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_i32(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(IconId::new(9).to_string(), "9");
    }
}
