//! Request handling for the flatdir directory service.
//!
//! A protocol engine (not part of this crate) decodes client requests and hands
//! them to a [`DirectoryHandler`]:
//!
//! - `bind(dn, password)` verifies credentials of users below the root base DN,
//! - `search(base, filter)` answers single-clause equality filters below the
//!   people or groups tree and returns projected [`Entry`] values.
//!
//! [`DirectoryService`] ties the handler to a backend and exposes reload and
//! shutdown, which [`spawn_signal_listener`] maps onto process signals.
//!
//! ```no_run
//! use flatdir_core::DirectoryConfig;
//! use flatdir_server::DirectoryService;
//!
//! # async fn run() -> flatdir_core::Result<()> {
//! let config = DirectoryConfig::new("dc=example,dc=com", ["users.json"])?;
//! let service = DirectoryService::open(&config).await?;
//!
//! let response = service
//!     .handler()
//!     .search("ou=people,dc=example,dc=com", "(cn=jdoe)")
//!     .await;
//! println!("{} entries", response.entries.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod entry;
pub mod handler;
pub mod service;

#[cfg(test)]
mod testing;

pub use entry::{project_group, project_groups, project_user, project_users, Entry};
pub use handler::{BindResponse, DirectoryHandler, SearchResponse};
#[cfg(unix)]
pub use service::spawn_signal_listener;
pub use service::DirectoryService;
