//! Projection of users and groups into directory entries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use flatdir_store::{entity_name_to_dn, entity_names_to_dns, Group, User};

/// Object class every user entry carries.
pub const USER_OBJECT_CLASS: &str = "inetOrgPerson";

/// Object class of group entries.
pub const GROUP_OBJECT_CLASS: &str = "groupOfNames";

/// Protocol-agnostic directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute map; values keep their order, attributes keep insertion order.
    pub attributes: IndexMap<String, Vec<String>>,
}

impl Entry {
    /// Creates an entry without attributes.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Returns the first value of the attribute if present.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)
            .and_then(|values| values.first().map(String::as_str))
    }

    /// Returns all values for the attribute.
    #[must_use]
    pub fn values(&self, attribute: &str) -> Option<&[String]> {
        self.attributes.get(attribute).map(Vec::as_slice)
    }

    /// Sets an attribute unless `values` is empty.
    fn set(&mut self, name: impl Into<String>, values: Vec<String>) {
        if !values.is_empty() {
            self.attributes.insert(name.into(), values);
        }
    }
}

/// Builds the entry of a user published below `people_base_dn`.
///
/// Source attributes are copied except `objectClass`, whose values are merged with
/// [`USER_OBJECT_CLASS`]. `memberOf` lists the DNs of the user's groups below
/// `groups_base_dn`.
#[must_use]
pub fn project_user(user: &User, people_base_dn: &str, groups_base_dn: &str) -> Entry {
    let mut entry = Entry::new(entity_name_to_dn(people_base_dn, &user.name));
    let mut classes = Vec::new();

    for (name, values) in &user.attributes {
        if name == "objectClass" {
            classes.extend(values.iter().cloned());
        } else {
            entry.set(name.clone(), values.clone());
        }
    }

    if !classes.iter().any(|class| class == USER_OBJECT_CLASS) {
        classes.push(USER_OBJECT_CLASS.to_string());
    }

    entry.set("cn", vec![user.name.clone()]);
    entry.set("objectClass", classes);
    entry.set("memberOf", entity_names_to_dns(groups_base_dn, &user.groups));
    entry
}

/// Builds the entry of a group published below `groups_base_dn`.
#[must_use]
pub fn project_group(group: &Group, people_base_dn: &str, groups_base_dn: &str) -> Entry {
    let mut entry = Entry::new(entity_name_to_dn(groups_base_dn, &group.name));
    entry.set("cn", vec![group.name.clone()]);
    entry.set("member", entity_names_to_dns(people_base_dn, &group.members));
    entry.set("objectClass", vec![GROUP_OBJECT_CLASS.to_string()]);
    entry
}

/// Projects users in order.
#[must_use]
pub fn project_users<'a, I>(users: I, people_base_dn: &str, groups_base_dn: &str) -> Vec<Entry>
where
    I: IntoIterator<Item = &'a User>,
{
    users
        .into_iter()
        .map(|user| project_user(user, people_base_dn, groups_base_dn))
        .collect()
}

/// Projects groups in order.
#[must_use]
pub fn project_groups<'a, I>(groups: I, people_base_dn: &str, groups_base_dn: &str) -> Vec<Entry>
where
    I: IntoIterator<Item = &'a Group>,
{
    groups
        .into_iter()
        .map(|group| project_group(group, people_base_dn, groups_base_dn))
        .collect()
}
