//! Configuration consumed by the directory core.
//!
//! The configuration names the directory trees users and groups are published
//! under, whether anonymous binds are accepted, and the data sources the store
//! loads (and reloads) from. Loading it from flags or files is left to the caller;
//! the type deserializes with `serde` and is checked with [`Validate`].

use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Relative name of the people tree below the root base DN.
pub const PEOPLE_RDN: &str = "ou=people";

/// Relative name of the groups tree below the root base DN.
pub const GROUPS_RDN: &str = "ou=groups";

/// Configuration for a directory instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DirectoryConfig {
    /// Root DN; bind DNs are translated against it.
    #[validate(length(min = 1))]
    pub base_dn: String,

    /// DN users are published under (default `ou=people,<base_dn>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub people_base_dn: Option<String>,

    /// DN groups are published under (default `ou=groups,<base_dn>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub groups_base_dn: Option<String>,

    /// Accept binds with an empty DN and empty password
    #[serde(default)]
    pub allow_anonymous_bind: bool,

    /// JSON documents with user and group data, processed in order
    #[validate(length(min = 1))]
    pub sources: Vec<PathBuf>,
}

impl DirectoryConfig {
    /// Create a new configuration with required parameters.
    ///
    /// # Arguments
    ///
    /// * `base_dn` - Root DN of the directory (e.g. `dc=example,dc=com`)
    /// * `sources` - Data files, later files override earlier ones
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the base DN is empty or no source is
    /// given.
    pub fn new<I, P>(base_dn: impl Into<String>, sources: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let config = Self {
            base_dn: base_dn.into(),
            people_base_dn: None,
            groups_base_dn: None,
            allow_anonymous_bind: false,
            sources: sources.into_iter().map(Into::into).collect(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Override the people tree DN.
    #[must_use]
    pub fn with_people_base_dn(mut self, dn: impl Into<String>) -> Self {
        self.people_base_dn = Some(dn.into());
        self
    }

    /// Override the groups tree DN.
    #[must_use]
    pub fn with_groups_base_dn(mut self, dn: impl Into<String>) -> Self {
        self.groups_base_dn = Some(dn.into());
        self
    }

    /// Allow or reject anonymous binds.
    #[must_use]
    pub const fn with_anonymous_bind(mut self, allowed: bool) -> Self {
        self.allow_anonymous_bind = allowed;
        self
    }

    /// Returns the root base DN.
    #[must_use]
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Returns the DN users are published under.
    #[must_use]
    pub fn people_base_dn(&self) -> String {
        self.people_base_dn
            .clone()
            .unwrap_or_else(|| format!("{PEOPLE_RDN},{}", self.base_dn))
    }

    /// Returns the DN groups are published under.
    #[must_use]
    pub fn groups_base_dn(&self) -> String {
        self.groups_base_dn
            .clone()
            .unwrap_or_else(|| format!("{GROUPS_RDN},{}", self.base_dn))
    }

    /// Returns the configured data sources.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_config_new() {
        let config = DirectoryConfig::new("dc=example,dc=com", ["users.json"]).unwrap();
        assert_eq!(config.base_dn(), "dc=example,dc=com");
        assert_eq!(config.people_base_dn(), "ou=people,dc=example,dc=com");
        assert_eq!(config.groups_base_dn(), "ou=groups,dc=example,dc=com");
        assert!(!config.allow_anonymous_bind);
        assert_eq!(config.sources(), &[PathBuf::from("users.json")]);
    }

    #[test]
    fn test_directory_config_requires_base_dn() {
        let result = DirectoryConfig::new("", ["users.json"]);
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[test]
    fn test_directory_config_requires_source() {
        let err = DirectoryConfig::new("dc=example,dc=com", Vec::<PathBuf>::new()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_directory_config_builder() {
        let config = DirectoryConfig::new("dc=example,dc=com", ["a.json", "b.json"])
            .unwrap()
            .with_people_base_dn("ou=users,dc=example,dc=com")
            .with_groups_base_dn("ou=teams,dc=example,dc=com")
            .with_anonymous_bind(true);

        assert_eq!(config.people_base_dn(), "ou=users,dc=example,dc=com");
        assert_eq!(config.groups_base_dn(), "ou=teams,dc=example,dc=com");
        assert!(config.allow_anonymous_bind);
        assert_eq!(config.sources().len(), 2);
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config: DirectoryConfig = serde_json::from_str(
            r#"{"base_dn": "dc=example,dc=com", "sources": ["/etc/flatdir/users.json"]}"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert!(!config.allow_anonymous_bind);
        assert!(config.people_base_dn.is_none());
        assert_eq!(config.groups_base_dn(), "ou=groups,dc=example,dc=com");
    }

    #[test]
    fn test_config_serialization() {
        let config = DirectoryConfig::new("dc=example,dc=com", ["users.json"])
            .unwrap()
            .with_anonymous_bind(true);

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("people_base_dn"));
        let deserialized: DirectoryConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_config_validation_empty_override() {
        let mut config = DirectoryConfig::new("dc=example,dc=com", ["users.json"]).unwrap();
        config.people_base_dn = Some(String::new());
        assert!(config.validate().is_err());

        config.people_base_dn = Some("ou=people,dc=example,dc=com".to_string());
        assert!(config.validate().is_ok());
    }
}
