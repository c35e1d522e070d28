//! Directory user representation and helpers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A user as published by the directory.
///
/// `name`, `attributes` and `password` come from the source documents; `groups` is
/// derived when a snapshot is loaded and is never read from source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user name (published as `cn`).
    pub name: String,
    /// Multi-valued attributes in source order.
    #[serde(rename = "attr", default)]
    pub attributes: IndexMap<String, Vec<String>>,
    /// Stored hash descriptor, e.g. `{SSHA}...`.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Names of the groups listing this user as a member, sorted.
    #[serde(skip)]
    pub groups: BTreeSet<String>,
}

impl User {
    /// Creates a builder for a new user instance.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> UserBuilder {
        UserBuilder {
            name: name.into(),
            attributes: IndexMap::new(),
            password: None,
            groups: BTreeSet::new(),
        }
    }

    /// Returns the stored credential, treating an empty string as absent.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.password.as_deref().filter(|password| !password.is_empty())
    }

    /// Returns all values for the attribute.
    #[must_use]
    pub fn values(&self, attribute: &str) -> Option<&[String]> {
        self.attributes.get(attribute).map(Vec::as_slice)
    }

    /// Returns true if the attribute holds `value` (exact match).
    #[must_use]
    pub fn has_value(&self, attribute: &str, value: &str) -> bool {
        self.values(attribute)
            .is_some_and(|values| values.iter().any(|v| v == value))
    }

    /// Returns true if the user belongs to the named group.
    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

/// Builder for [`User`].
#[derive(Debug)]
pub struct UserBuilder {
    name: String,
    attributes: IndexMap<String, Vec<String>>,
    password: Option<String>,
    groups: BTreeSet<String>,
}

impl UserBuilder {
    /// Sets the values of an attribute, replacing earlier ones.
    #[must_use]
    pub fn attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the stored hash descriptor.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Adds a group membership.
    #[must_use]
    pub fn add_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Finalises the builder and returns the [`User`].
    #[must_use]
    pub fn build(self) -> User {
        User {
            name: self.name,
            attributes: self.attributes,
            password: self.password,
            groups: self.groups,
        }
    }
}
