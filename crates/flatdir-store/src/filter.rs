//! Search filter parsing.
//!
//! Only a single equality clause `(key=value)` is understood. Keys are ASCII word
//! characters. `(objectClass=*)` selects everything.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use flatdir_core::{Error, Result};

static FILTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(([A-Za-z0-9_]+)=([^)=]+)\)$").expect("filter pattern is valid"));

/// A parsed `(key=value)` filter.
///
/// An empty key and value means "match all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchFilter {
    key: String,
    value: String,
}

impl SearchFilter {
    /// Creates an equality filter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The filter selecting every entry.
    #[must_use]
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Attribute name, empty for match-all.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Attribute value, empty for match-all.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if the filter selects every entry.
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_match_all() {
            f.write_str("(objectClass=*)")
        } else {
            write!(f, "({}={})", self.key, self.value)
        }
    }
}

/// Parses a search filter string.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFilter`] for anything but a single `(key=value)`
/// clause.
pub fn parse_filter(filter: &str) -> Result<SearchFilter> {
    let captures = FILTER_PATTERN
        .captures(filter)
        .ok_or_else(|| Error::UnsupportedFilter(filter.to_string()))?;

    let key = &captures[1];
    let value = &captures[2];
    if key == "objectClass" && value == "*" {
        Ok(SearchFilter::match_all())
    } else {
        Ok(SearchFilter::new(key, value))
    }
}
