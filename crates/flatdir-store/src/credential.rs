//! Stored credential verification.
//!
//! The only recognized scheme is salted SHA-1 as written by `slappasswd -h {SSHA}`
//! with a 4 byte salt: the literal `{SSHA}` followed by the base64 encoding of the
//! 20 byte digest and the salt, 38 characters in total. Anything else is treated as
//! an unknown hash method and never matches.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha1::{Digest, Sha1};
use tracing::{error, warn};

use flatdir_core::{Error, Result};

/// Scheme prefix of salted SHA-1 credentials.
pub const SSHA_PREFIX: &str = "{SSHA}";

/// Total length of a stored `{SSHA}` credential with a 4 byte salt.
pub const SSHA_STORED_LEN: usize = 38;

const SHA1_DIGEST_LEN: usize = 20;

/// Checks `password` against the stored credential of `username`.
///
/// Returns `Ok(false)` for unknown hash methods.
///
/// # Errors
///
/// Returns [`Error::CredentialDecode`] if the credential looks like `{SSHA}` but its
/// payload is not valid base64 or is too short to carry a salt.
pub fn verify_password(username: &str, password: &str, stored: &str) -> Result<bool> {
    if stored.len() == SSHA_STORED_LEN && stored.starts_with(SSHA_PREFIX) {
        verify_ssha(username, password, &stored[SSHA_PREFIX.len()..])
    } else {
        warn!("unknown password hash method for user {username}");
        Ok(false)
    }
}

fn verify_ssha(username: &str, password: &str, encoded: &str) -> Result<bool> {
    let decoded = BASE64.decode(encoded).map_err(|err| {
        error!("error decoding password for user {username}: {err}");
        Error::CredentialDecode {
            user: username.to_string(),
        }
    })?;

    if decoded.len() <= SHA1_DIGEST_LEN {
        error!("stored password for user {username} carries no salt");
        return Err(Error::CredentialDecode {
            user: username.to_string(),
        });
    }

    let (digest, salt) = decoded.split_at(SHA1_DIGEST_LEN);
    Ok(ssha_digest(password, salt).as_slice() == digest)
}

fn ssha_digest(password: &str, salt: &[u8]) -> [u8; SHA1_DIGEST_LEN] {
    let mut hasher = Sha1::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    let mut digest = [0u8; SHA1_DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Produces a stored `{SSHA}` credential for `password` with the given salt.
///
/// With a 4 byte salt the result is accepted by [`verify_password`].
#[must_use]
pub fn hash_password_ssha(password: &str, salt: &[u8]) -> String {
    let mut payload = ssha_digest(password, salt).to_vec();
    payload.extend_from_slice(salt);
    format!("{SSHA_PREFIX}{}", BASE64.encode(payload))
}
