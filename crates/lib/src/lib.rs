//!
//! Squad: the gateway in front of the sales-incentive dashboard.
//!
//! Representatives sign in with a Google Workspace account; the server checks
//! the signed session on every request to a dashboard page, admits only
//! configured email domains, and renders data read from a spreadsheet-backed
//! Apps Script API through a read-through cache.
//!
//! ## Core Concepts
//!
//! * **Sessions (`auth::Session`)**: signed HS256 tokens carrying subject,
//!   email and expiry. Validated with [`auth::SessionValidator`].
//! * **Allow-list (`auth::AllowList`)**: the email domains that may use the
//!   dashboard.
//! * **Route guard (`guard::RouteGuard`)**: decides, per request path, whether
//!   to let a request through or redirect it.
//! * **Operations (`backend::Operation`)**: the closed set of read-only calls
//!   the backend supports.
//! * **Fetch cache (`cache::FetchCache`)**: single-flight, staleness-aware
//!   cache with bounded retries.
//! * **Store (`store::Store`)**: explicit per-request application state with a
//!   reducer.

pub mod auth;
pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod constants;
pub mod format;
pub mod guard;
pub mod server;
pub mod store;

pub use clock::{Clock, SystemClock};

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;

/// Result type used throughout the Squad library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Squad library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured backend errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(config::ConfigError),

    /// Structured state-loading errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::Backend(_) => "backend",
            Error::Config(_) => "config",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this error came from the remote data backend.
    pub fn is_upstream_error(&self) -> bool {
        match self {
            Error::Backend(_) => true,
            Error::Store(store_err) => store_err.is_upstream_error(),
            _ => false,
        }
    }

    /// Check if this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_transient(),
            Error::Store(store_err) => store_err.is_transient(),
            _ => false,
        }
    }
}

impl From<auth::AuthError> for Error {
    fn from(err: auth::AuthError) -> Self {
        Error::Auth(err)
    }
}

impl From<backend::BackendError> for Error {
    fn from(err: backend::BackendError) -> Self {
        Error::Backend(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<store::StoreError> for Error {
    fn from(err: store::StoreError) -> Self {
        Error::Store(err)
    }
}
