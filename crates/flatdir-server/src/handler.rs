//! Bind and search request handling.
//!
//! [`DirectoryHandler`] is what a protocol engine calls for every request. It
//! normalizes the request (DN translation, filter parsing), asks the [`Backend`]
//! and maps the outcome onto a [`ResultCode`].

use secrecy::SecretString;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::entry::{project_groups, project_users, Entry};
use flatdir_core::{DirectoryConfig, Error, Result, ResultCode};
use flatdir_store::{parse_filter, Backend, DnTranslator};

/// Outcome of a bind request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindResponse {
    /// Result code reported to the client.
    pub code: ResultCode,
    /// Cause of an operations error.
    pub error: Option<Error>,
}

impl BindResponse {
    fn new(code: ResultCode) -> Self {
        Self { code, error: None }
    }

    fn failed(error: Error) -> Self {
        Self {
            code: ResultCode::OperationsError,
            error: Some(error),
        }
    }
}

/// Outcome of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// Result code reported to the client.
    pub code: ResultCode,
    /// Matching entries, in backend order.
    pub entries: Vec<Entry>,
    /// Cause of an operations error.
    pub error: Option<Error>,
}

impl SearchResponse {
    fn new(code: ResultCode, entries: Vec<Entry>) -> Self {
        Self {
            code,
            entries,
            error: None,
        }
    }

    fn failed(error: Error) -> Self {
        Self {
            code: ResultCode::OperationsError,
            entries: Vec::new(),
            error: Some(error),
        }
    }
}

/// Tree a search is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tree {
    People,
    Groups,
}

/// Request orchestrator shared by every connection.
pub struct DirectoryHandler {
    backend: Arc<dyn Backend>,
    translator: DnTranslator,
    people_base_dn: String,
    groups_base_dn: String,
    allow_anonymous_bind: bool,
}

impl fmt::Debug for DirectoryHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryHandler")
            .field("base_dn", &self.translator.base_dn())
            .field("people_base_dn", &self.people_base_dn)
            .field("groups_base_dn", &self.groups_base_dn)
            .field("allow_anonymous_bind", &self.allow_anonymous_bind)
            .finish_non_exhaustive()
    }
}

impl DirectoryHandler {
    /// Creates a handler answering from `backend` with the trees named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base DN cannot be used for translation.
    pub fn new(config: &DirectoryConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        Ok(Self {
            backend,
            translator: DnTranslator::new(config.base_dn())?,
            people_base_dn: config.people_base_dn(),
            groups_base_dn: config.groups_base_dn(),
            allow_anonymous_bind: config.allow_anonymous_bind,
        })
    }

    /// DN users are published under.
    #[must_use]
    pub fn people_base_dn(&self) -> &str {
        &self.people_base_dn
    }

    /// DN groups are published under.
    #[must_use]
    pub fn groups_base_dn(&self) -> &str {
        &self.groups_base_dn
    }

    /// Authenticates `bind_dn` with `password`.
    pub async fn bind(&self, bind_dn: &str, password: &str) -> BindResponse {
        debug!("bind request: bindDn={bind_dn}");

        if bind_dn.is_empty() && password.is_empty() {
            debug!("anonymous bind, allowed={}", self.allow_anonymous_bind);
            return if self.allow_anonymous_bind {
                BindResponse::new(ResultCode::Success)
            } else {
                BindResponse::new(ResultCode::InvalidCredentials)
            };
        }

        let Some(username) = self.translator.entity_name(bind_dn) else {
            return BindResponse::new(ResultCode::InvalidCredentials);
        };

        let password = SecretString::from(password.to_string());
        match self.backend.check_credential(&username, &password).await {
            Ok(true) => {
                debug!("bind succeeded for {username}");
                BindResponse::new(ResultCode::Success)
            }
            Ok(false) => {
                debug!("invalid credentials for {username}");
                BindResponse::new(ResultCode::InvalidCredentials)
            }
            Err(err) => {
                log_failure("bind", &err);
                BindResponse::failed(err)
            }
        }
    }

    /// Answers a single-clause equality search below `base_dn`.
    pub async fn search(&self, base_dn: &str, filter: &str) -> SearchResponse {
        debug!("search request: baseDn={base_dn}, filter={filter}");

        let Some(tree) = self.route(base_dn) else {
            debug!("search base {base_dn} is outside the published trees");
            return SearchResponse::new(ResultCode::InsufficientAccessRights, Vec::new());
        };

        let filter = match parse_filter(filter) {
            Ok(filter) => filter,
            Err(err) => {
                log_failure("search", &err);
                return SearchResponse::failed(err);
            }
        };

        let entries = match tree {
            Tree::People => self
                .backend
                .query_users(filter.key(), filter.value())
                .await
                .map(|users| {
                    users.map(|users| {
                        project_users(
                            users.iter().map(Arc::as_ref),
                            &self.people_base_dn,
                            &self.groups_base_dn,
                        )
                    })
                }),
            Tree::Groups => self
                .backend
                .query_groups(filter.key(), filter.value())
                .await
                .map(|groups| {
                    groups.map(|groups| {
                        project_groups(
                            groups.iter().map(Arc::as_ref),
                            &self.people_base_dn,
                            &self.groups_base_dn,
                        )
                    })
                }),
        };

        match entries {
            Ok(Some(entries)) => {
                debug!("search {filter} returned {} entries", entries.len());
                SearchResponse::new(ResultCode::Success, entries)
            }
            Ok(None) => {
                warn!("backend returned no result for {filter} below {base_dn}");
                SearchResponse::new(ResultCode::Success, Vec::new())
            }
            Err(err) => {
                log_failure("search", &err);
                SearchResponse::failed(err)
            }
        }
    }

    fn route(&self, base_dn: &str) -> Option<Tree> {
        if base_dn == self.people_base_dn {
            Some(Tree::People)
        } else if base_dn == self.groups_base_dn {
            Some(Tree::Groups)
        } else {
            None
        }
    }
}

fn log_failure(operation: &str, err: &Error) {
    if err.should_log() {
        error!("{operation} failed [{}]: {err}", err.error_code());
    } else {
        debug!("{operation} rejected [{}]: {err}", err.error_code());
    }
}
