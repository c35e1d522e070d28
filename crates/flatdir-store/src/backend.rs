//! Storage abstraction consumed by the request handler.

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;

use crate::{group::Group, user::User};
use flatdir_core::Result;

/// Capabilities a directory backend provides to the request handler.
///
/// Query methods take a filter key and value as produced by
/// [`crate::filter::parse_filter`]; an empty key or value, or the value `*`, selects
/// every entity. `Ok(None)` means the backend had nothing to report, which the
/// handler answers with an empty successful search.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Verifies a user's password.
    ///
    /// Unknown users and users without a stored credential yield `Ok(false)`.
    async fn check_credential(&self, username: &str, password: &SecretString) -> Result<bool>;

    /// Returns the users matching the filter.
    async fn query_users(&self, key: &str, value: &str) -> Result<Option<Vec<Arc<User>>>>;

    /// Returns the groups matching the filter.
    async fn query_groups(&self, key: &str, value: &str) -> Result<Option<Vec<Arc<Group>>>>;

    /// Reloads the backend's data. On failure the previous data stays in use.
    async fn reload(&self) -> Result<()>;
}
