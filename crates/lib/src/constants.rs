//! Constants used throughout the Squad library.

use std::time::Duration;

/// Cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "squad_session";

/// Email domain admitted when no allow-list is configured.
pub const DEFAULT_ALLOWED_DOMAIN: &str = "cronberry.com";

/// Sessions expire this long after sign-in unless configured otherwise.
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Longest session lifetime accepted from configuration.
pub const MAX_SESSION_MAX_AGE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Backend data is considered fresh for this long.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(15 * 60);

/// Timeout for a single backend request.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Automatic retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Where unauthenticated requests to protected pages are sent.
pub const HOME_PATH: &str = "/";

/// Error page used for authorization failures.
pub const AUTH_ERROR_PATH: &str = "/auth/error";
