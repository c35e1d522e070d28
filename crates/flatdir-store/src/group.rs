//! Directory group representation.

use serde::{Deserialize, Serialize};

/// A group as declared in a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group name (published as `cn`).
    pub name: String,
    /// Member user names in declared order. Not validated against known users.
    #[serde(rename = "member", default)]
    pub members: Vec<String>,
}

impl Group {
    /// Creates a new builder with the required fields.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> GroupBuilder {
        GroupBuilder {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Returns the number of declared members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Checks whether the user name is listed as a member.
    #[must_use]
    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }
}

/// Builder for [`Group`].
#[derive(Debug)]
pub struct GroupBuilder {
    name: String,
    members: Vec<String>,
}

impl GroupBuilder {
    /// Appends a member name.
    #[must_use]
    pub fn add_member(mut self, name: impl Into<String>) -> Self {
        self.members.push(name.into());
        self
    }

    /// Replaces the member list.
    #[must_use]
    pub fn members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }

    /// Finalises the builder.
    #[must_use]
    pub fn build(self) -> Group {
        Group {
            name: self.name,
            members: self.members,
        }
    }
}
