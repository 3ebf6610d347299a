//! Free-text search term parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Runs of whitespace and separator punctuation split tokens.
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s$/\-_.,;]+").expect("Invalid regex"));

/// Ordered search tokens parsed from user input.
///
/// Tokens keep the case and form the user typed; matching rules belong to
/// the full-text query, not the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchTerms {
    tokens: Vec<String>,
}

impl SearchTerms {
    /// Split raw input into tokens. `None` yields no tokens.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let tokens = raw
            .map(|raw| {
                SEPARATOR_RE
                    .split(raw)
                    .filter(|token| !token.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self { tokens }
    }

    /// True when the input contained no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens in input order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Iterate over tokens in input order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for SearchTerms {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            tokens: iter
                .into_iter()
                .map(|s| s.as_ref().to_owned())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &str) -> Vec<String> {
        SearchTerms::parse(Some(raw)).tokens().to_vec()
    }

    #[test]
    fn test_comma_and_space() {
        assert_eq!(tokens("mexico, sunset"), ["mexico", "sunset"]);
    }

    #[test]
    fn test_blank_input() {
        assert!(SearchTerms::parse(Some("  ")).is_empty());
        assert!(SearchTerms::parse(Some("")).is_empty());
        assert!(SearchTerms::parse(None).is_empty());
    }

    #[test]
    fn test_punctuation_without_spaces() {
        assert_eq!(tokens("a/b-c"), ["a", "b", "c"]);
    }

    #[test]
    fn test_every_separator() {
        assert_eq!(
            tokens("one$two/three-four_five.six,seven;eight\tnine"),
            ["one", "two", "three", "four", "five", "six", "seven", "eight", "nine"]
        );
    }

    #[test]
    fn test_leading_and_trailing_separators() {
        assert_eq!(tokens(" ,;Lake  Bled.. "), ["Lake", "Bled"]);
    }

    #[test]
    fn test_case_and_form_preserved() {
        assert_eq!(tokens("Sunsets ÉTÉ"), ["Sunsets", "ÉTÉ"]);
    }

    #[test]
    fn test_len() {
        let terms = SearchTerms::parse(Some("old town square"));
        assert_eq!(terms.len(), 3);
        assert_eq!(terms.iter().collect::<Vec<_>>(), ["old", "town", "square"]);
    }
}
