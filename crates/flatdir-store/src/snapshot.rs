//! Immutable, fully loaded view of the directory.
//!
//! A [`Snapshot`] is built by [`Snapshot::load`] from one or more JSON sources and
//! never changes afterwards, apart from its filter caches which only grow. Reloading
//! builds a new snapshot and swaps it in wholesale.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::{group::Group, user::User};
use flatdir_core::{Error, Result};

/// Content of a single source document.
#[derive(Debug, Default, Deserialize)]
pub struct SourceDocument {
    /// Users declared in the document.
    #[serde(default)]
    pub users: Vec<User>,
    /// Groups declared in the document.
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl SourceDocument {
    /// Parses a source document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceParse`] if `content` is not a valid document.
    pub fn parse(path: &Path, content: &[u8]) -> Result<Self> {
        serde_json::from_slice(content).map_err(|err| Error::SourceParse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceRead`] if the file cannot be read and
    /// [`Error::SourceParse`] if it is malformed.
    pub async fn read(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|err| Error::SourceRead {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        Self::parse(path, &content)
    }
}

/// Memoized query results keyed by `(key=value)`.
pub(crate) type FilterCache<T> = RwLock<HashMap<String, Arc<[Arc<T>]>>>;

/// Immutable directory data plus per-snapshot query caches.
#[derive(Debug, Default)]
pub struct Snapshot {
    users: IndexMap<String, Arc<User>>,
    groups: IndexMap<String, Arc<Group>>,
    pub(crate) users_by_filter: FilterCache<User>,
    pub(crate) groups_by_filter: FilterCache<Group>,
    loaded_from: Vec<PathBuf>,
}

impl Snapshot {
    /// Reads every source in order and builds a snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first read or parse error; nothing is built in that case.
    pub async fn load(sources: &[PathBuf]) -> Result<Self> {
        let mut documents = Vec::with_capacity(sources.len());
        for path in sources {
            info!("loading users and groups data from {}", path.display());
            documents.push(SourceDocument::read(path).await?);
        }

        let mut snapshot = Self::from_documents(documents);
        snapshot.loaded_from = sources.to_vec();
        info!(
            "loaded {} users and {} groups",
            snapshot.user_count(),
            snapshot.group_count()
        );
        Ok(snapshot)
    }

    /// Builds a snapshot from already parsed documents.
    ///
    /// Later documents replace same-named users and groups of earlier ones; the
    /// replaced entity keeps the position of its first appearance.
    #[must_use]
    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        let mut users: IndexMap<String, User> = IndexMap::new();
        let mut groups: IndexMap<String, Group> = IndexMap::new();

        for document in documents {
            for mut user in document.users {
                debug!("adding user {:?}", user.name);
                user.groups.clear();
                users.insert(user.name.clone(), user);
            }
            for group in document.groups {
                debug!(
                    "adding group {:?} with {} members",
                    group.name,
                    group.member_count()
                );
                groups.insert(group.name.clone(), group);
            }
        }

        for group in groups.values() {
            for member in &group.members {
                if let Some(user) = users.get_mut(member) {
                    debug!("adding user {member} to group {}", group.name);
                    user.groups.insert(group.name.clone());
                }
            }
        }

        Self {
            users: users
                .into_iter()
                .map(|(name, user)| (name, Arc::new(user)))
                .collect(),
            groups: groups
                .into_iter()
                .map(|(name, group)| (name, Arc::new(group)))
                .collect(),
            users_by_filter: RwLock::default(),
            groups_by_filter: RwLock::default(),
            loaded_from: Vec::new(),
        }
    }

    /// Looks up a user by exact name.
    #[must_use]
    pub fn user(&self, name: &str) -> Option<&Arc<User>> {
        self.users.get(name)
    }

    /// Looks up a group by exact name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Arc<Group>> {
        self.groups.get(name)
    }

    /// Iterates over users in snapshot order.
    pub fn users(&self) -> impl Iterator<Item = &Arc<User>> + '_ {
        self.users.values()
    }

    /// Iterates over groups in snapshot order.
    pub fn groups(&self) -> impl Iterator<Item = &Arc<Group>> + '_ {
        self.groups.values()
    }

    /// Number of users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Sources the snapshot was loaded from.
    #[must_use]
    pub fn loaded_from(&self) -> &[PathBuf] {
        &self.loaded_from
    }

    /// Number of memoized user and group queries.
    #[must_use]
    pub fn cached_queries(&self) -> (usize, usize) {
        (cache_len(&self.users_by_filter), cache_len(&self.groups_by_filter))
    }
}

fn cache_len<T>(cache: &FilterCache<T>) -> usize {
    cache
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .len()
}
