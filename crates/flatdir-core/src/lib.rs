//! # flatdir-core
//!
//! Core types shared by the flatdir crates.
//!
//! flatdir publishes users and groups loaded from static JSON documents through a
//! small subset of a directory-access protocol (bind and single-clause equality
//! search). This crate holds the pieces every layer needs.
//!
//! ## Modules
//!
//! - [`error`] - Error type and error codes
//! - [`config`] - Directory configuration consumed by the store and request handler
//! - [`result_code`] - Protocol result codes returned to the protocol engine

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result_code;

// Re-export commonly used types
pub use config::DirectoryConfig;
pub use error::{Error, Result};
pub use result_code::ResultCode;
