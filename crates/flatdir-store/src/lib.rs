//! User and group store for the flatdir directory service.
//!
//! Users and groups are read from JSON documents into an immutable [`Snapshot`]
//! that is replaced wholesale on reload. The crate also provides the building
//! blocks the request handler needs to talk about the data: the `(key=value)`
//! filter parser, DN to entity name translation and `{SSHA}` credential
//! verification.

#![deny(missing_docs)]

mod backend;
pub mod credential;
pub mod dn;
pub mod filter;
mod group;
mod snapshot;
mod store;
mod user;

pub use backend::Backend;
pub use credential::{hash_password_ssha, verify_password};
pub use dn::{dn_to_entity_name, entity_name_to_dn, entity_names_to_dns, DnTranslator};
pub use filter::{parse_filter, SearchFilter};
pub use group::{Group, GroupBuilder};
pub use snapshot::{Snapshot, SourceDocument};
pub use store::DirectoryStore;
pub use user::{User, UserBuilder};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = flatdir_core::Result<T>;
