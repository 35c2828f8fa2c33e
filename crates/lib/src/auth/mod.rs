//! Authentication module for Squad
//!
//! Sessions are HS256-signed tokens issued at sign-in and verified on every
//! request. Admission is decided separately by the domain allow-list, so a
//! perfectly valid session from the wrong Workspace is still refused.

pub mod errors;
pub mod policy;
pub mod session;

// Re-export main types for easier access
pub use errors::AuthError;
pub use policy::{AllowList, is_allowed, normalize_email};
pub use session::{Session, SessionClaims, SessionIssuer, SessionValidator};
