//! Conversion between distinguished names and entity names.
//!
//! Entities are published as `cn=<name>,<base>`. The reverse direction is lenient
//! about what sits between the `cn` component and the base (so
//! `cn=jdoe,ou=people,dc=example,dc=com` resolves against `dc=example,dc=com`) and
//! always yields a lower-cased name.

use regex::Regex;
use tracing::warn;

use flatdir_core::{Error, Result};

/// Builds the DN of an entity below `base_dn`.
#[must_use]
pub fn entity_name_to_dn(base_dn: &str, name: &str) -> String {
    format!("cn={name},{base_dn}")
}

/// Builds the DNs of several entities below `base_dn`, preserving order.
#[must_use]
pub fn entity_names_to_dns<I, S>(base_dn: &str, names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| entity_name_to_dn(base_dn, name.as_ref()))
        .collect()
}

/// Extracts the lower-cased entity name from `dn` if it lies below `base_dn`.
///
/// Compiles the matcher on every call; keep a [`DnTranslator`] for repeated use.
#[must_use]
pub fn dn_to_entity_name(base_dn: &str, dn: &str) -> Option<String> {
    DnTranslator::new(base_dn).ok()?.entity_name(dn)
}

/// Reusable DN to entity name matcher for a fixed base DN.
#[derive(Debug, Clone)]
pub struct DnTranslator {
    base_dn: String,
    pattern: Regex,
}

impl DnTranslator {
    /// Compiles the matcher for `base_dn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base DN cannot be turned into a matcher.
    pub fn new(base_dn: impl Into<String>) -> Result<Self> {
        let base_dn = base_dn.into();
        let pattern = Regex::new(&format!(
            "^cn=([^,]+),.*{}$",
            regex::escape(&base_dn.to_lowercase())
        ))
        .map_err(|err| Error::ConfigError(format!("invalid base DN `{base_dn}`: {err}")))?;

        Ok(Self { base_dn, pattern })
    }

    /// Base DN the translator matches against.
    #[must_use]
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Extracts the lower-cased entity name from `dn`.
    #[must_use]
    pub fn entity_name(&self, dn: &str) -> Option<String> {
        let normalized = dn.to_lowercase();
        let name = self
            .pattern
            .captures(&normalized)
            .and_then(|captures| captures.get(1))
            .map(|name| name.as_str().to_string());

        if name.is_none() {
            warn!(
                "failed to convert dn={dn} to entity name, baseDn={}",
                self.base_dn
            );
        }
        name
    }
}
