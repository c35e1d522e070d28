//! File-backed directory store with atomic reload.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

use crate::{
    backend::Backend,
    credential::verify_password,
    group::Group,
    snapshot::{FilterCache, Snapshot},
    user::User,
};
use flatdir_core::Result;

/// Directory store serving queries from the currently published [`Snapshot`].
///
/// Readers clone the snapshot pointer under a short read lock and then work on
/// their own reference, so a concurrent [`DirectoryStore::reload`] never tears a
/// query. Reload parses every source before taking the write lock, which is held
/// only for the pointer swap.
#[derive(Debug)]
pub struct DirectoryStore {
    sources: Vec<PathBuf>,
    current: RwLock<Arc<Snapshot>>,
}

impl DirectoryStore {
    /// Loads the sources and creates a store serving them.
    ///
    /// # Errors
    ///
    /// Returns the first source read or parse error.
    pub async fn open<I, P>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let sources: Vec<PathBuf> = sources.into_iter().map(Into::into).collect();
        let snapshot = Snapshot::load(&sources).await?;
        Ok(Self::with_snapshot(sources, snapshot))
    }

    /// Creates a store from an already built snapshot.
    ///
    /// `sources` are used by later reloads.
    #[must_use]
    pub fn with_snapshot(sources: Vec<PathBuf>, snapshot: Snapshot) -> Self {
        Self {
            sources,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Sources read on reload, in processing order.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Returns the currently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Loads all sources and publishes the result.
    ///
    /// # Errors
    ///
    /// Returns the first source error; the published snapshot is left untouched.
    pub async fn reload(&self) -> Result<()> {
        let snapshot = Snapshot::load(&self.sources).await.map_err(|err| {
            error!("error reloading users and groups data: {err}");
            err
        })?;

        info!(
            "published new directory snapshot loaded from {:?}",
            snapshot.loaded_from()
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        Ok(())
    }

    /// Verifies `password` for `username` against the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`flatdir_core::Error::CredentialDecode`] if the stored credential is
    /// corrupt.
    pub fn check_credential(&self, username: &str, password: &str) -> Result<bool> {
        let snapshot = self.snapshot();
        match snapshot.user(username).and_then(|user| user.credential()) {
            Some(stored) => verify_password(username, password, stored),
            None => Ok(false),
        }
    }

    /// Returns the users matching `(key=value)`.
    ///
    /// `cn` is an exact name lookup and `memberOf` lists a group's members in
    /// declared order; both yield an empty result for unknown names. Any other key
    /// is an attribute equality match, memoized per snapshot.
    #[must_use]
    pub fn query_users(&self, key: &str, value: &str) -> Vec<Arc<User>> {
        let snapshot = self.snapshot();

        if is_wildcard(key, value) {
            return snapshot.users().cloned().collect();
        }

        match key {
            "cn" => {
                let user = snapshot.user(value).cloned();
                if user.is_none() {
                    debug!("no user named {value}");
                }
                user.into_iter().collect()
            }
            "memberOf" => snapshot
                .group(value)
                .map(|group| {
                    group
                        .members
                        .iter()
                        .filter_map(|member| snapshot.user(member).cloned())
                        .collect()
                })
                .unwrap_or_default(),
            _ => cached(&snapshot.users_by_filter, key, value, "users", || {
                snapshot
                    .users()
                    .filter(|user| user.has_value(key, value))
                    .cloned()
                    .collect()
            }),
        }
    }

    /// Returns the groups matching `(key=value)`.
    ///
    /// Only `member` is supported as a key; every other key, including `cn`,
    /// matches nothing.
    #[must_use]
    pub fn query_groups(&self, key: &str, value: &str) -> Vec<Arc<Group>> {
        let snapshot = self.snapshot();

        if is_wildcard(key, value) {
            return snapshot.groups().cloned().collect();
        }

        if key == "member" {
            cached(&snapshot.groups_by_filter, key, value, "groups", || {
                snapshot
                    .groups()
                    .filter(|group| group.has_member(value))
                    .cloned()
                    .collect()
            })
        } else {
            Vec::new()
        }
    }
}

#[async_trait]
impl Backend for DirectoryStore {
    async fn check_credential(&self, username: &str, password: &SecretString) -> Result<bool> {
        DirectoryStore::check_credential(self, username, password.expose_secret())
    }

    async fn query_users(&self, key: &str, value: &str) -> Result<Option<Vec<Arc<User>>>> {
        Ok(Some(DirectoryStore::query_users(self, key, value)))
    }

    async fn query_groups(&self, key: &str, value: &str) -> Result<Option<Vec<Arc<Group>>>> {
        Ok(Some(DirectoryStore::query_groups(self, key, value)))
    }

    async fn reload(&self) -> Result<()> {
        DirectoryStore::reload(self).await
    }
}

fn is_wildcard(key: &str, value: &str) -> bool {
    key.is_empty() || value.is_empty() || value == "*"
}

/// Cache key of a `(key=value)` query.
fn cache_key(key: &str, value: &str) -> String {
    format!("({key}={value})")
}

fn cached<T, F>(
    cache: &FilterCache<T>,
    key: &str,
    value: &str,
    kind: &str,
    compute: F,
) -> Vec<Arc<T>>
where
    F: FnOnce() -> Vec<Arc<T>>,
{
    let filter = cache_key(key, value);

    let hit = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&filter)
        .cloned();
    if let Some(entries) = hit {
        debug!("cache hit for filter {filter} on {kind}");
        return entries.to_vec();
    }

    debug!("cache miss for filter {filter} on {kind}");
    let entries: Arc<[Arc<T>]> = compute().into();
    cache
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(filter, Arc::clone(&entries));
    entries.to_vec()
}
