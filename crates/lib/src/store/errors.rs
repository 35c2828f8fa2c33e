//! Error types for loading application state.

use thiserror::Error;

use crate::{backend::BackendError, cache::CacheError};

/// Errors raised while loading a signed-in representative's profile.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The session email matches no row of the users sheet.
    #[error("No representative is registered for '{email}'")]
    NotRegistered { email: String },

    /// A backend call failed after retries.
    #[error(transparent)]
    Fetch(#[from] CacheError<BackendError>),

    /// The backend answered, but not with the expected shape.
    #[error("Invalid {operation} data: {reason}")]
    Decode { operation: String, reason: String },
}

impl StoreError {
    /// Check if the signed-in account has no representative record
    pub fn is_not_registered(&self) -> bool {
        matches!(self, StoreError::NotRegistered { .. })
    }

    /// Check if the remote backend is at fault
    pub fn is_upstream_error(&self) -> bool {
        matches!(self, StoreError::Fetch(_) | StoreError::Decode { .. })
    }

    /// Check if retrying later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Fetch(err) => err.is_transient(),
            _ => false,
        }
    }
}
