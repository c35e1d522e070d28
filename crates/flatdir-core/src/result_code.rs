//! Protocol result codes handed back to the protocol engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a bind or search request.
///
/// Discriminants are the LDAP wire values, so a protocol engine can forward them
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultCode {
    /// The operation completed.
    Success = 0,
    /// The request could not be served because of an internal or client error.
    OperationsError = 1,
    /// Bind rejected.
    InvalidCredentials = 49,
    /// Search base is outside the published trees.
    InsufficientAccessRights = 50,
}

impl ResultCode {
    /// Returns the numeric LDAP result code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Returns the LDAP name of the code.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::OperationsError => "operationsError",
            Self::InvalidCredentials => "invalidCredentials",
            Self::InsufficientAccessRights => "insufficientAccessRights",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
