//! Authentication error types.

use thiserror::Error;

/// Errors produced while issuing or verifying sessions.
///
/// Verification failures are reported here for diagnostics only; the route
/// guard collapses every one of them into "no session".
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token could not be decoded (bad encoding, wrong algorithm, missing claims).
    #[error("Session token is malformed")]
    MalformedToken {
        /// The underlying decoding error
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    /// Token was signed with a different secret or altered.
    #[error("Session token signature is invalid")]
    InvalidSignature,

    /// Token was valid but its expiry has passed.
    #[error("Session expired at {expired_at}")]
    Expired {
        /// Expiry timestamp (seconds since epoch)
        expired_at: i64,
    },

    /// Email is outside every allowed domain.
    #[error("Email '{email}' is not in an allowed domain")]
    DomainNotAllowed {
        /// The rejected email address
        email: String,
    },

    /// The session lifetime does not fit in a token expiry.
    #[error("Session max age of {max_age_secs}s is out of range")]
    LifetimeOutOfRange {
        /// The configured max age in seconds
        max_age_secs: u64,
    },

    /// Token signing failed.
    #[error("Failed to sign session token")]
    Signing {
        /// The underlying encoding error
        #[source]
        source: jsonwebtoken::errors::Error,
    },
}

impl AuthError {
    /// Check if this error means the token itself cannot be trusted.
    pub fn is_invalid_token(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken { .. } | AuthError::InvalidSignature
        )
    }

    /// Check if this error indicates an expired session.
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::Expired { .. })
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AuthError::DomainNotAllowed { .. })
    }
}
