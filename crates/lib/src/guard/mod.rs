//! Route protection.
//!
//! [`RouteGuard::evaluate`] is a pure decision over (path, credential,
//! configuration). The axum layer in [`middleware`] only extracts the
//! credential and turns the decision into a response.
//!
//! Every failure to establish a session, whatever its cause, yields
//! [`GuardDecision::RedirectHome`]. The guard never fails open.

pub mod middleware;
pub mod paths;

use std::fmt;

use crate::auth::{AllowList, Session, SessionValidator};
use crate::constants::{AUTH_ERROR_PATH, HOME_PATH};

pub use middleware::{credential_from, route_guard};
pub use paths::{PathClass, classify};

/// Reason codes carried to the error page in the `error` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Signed in, but from a domain outside the allow-list.
    AccessDenied,
    /// The server's authentication setup is broken.
    Configuration,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AccessDenied => "AccessDenied",
            ErrorCode::Configuration => "Configuration",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "AccessDenied" => Some(ErrorCode::AccessDenied),
            "Configuration" => Some(ErrorCode::Configuration),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of the guard for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Pass the request on. Protected paths carry the verified session.
    Allow { session: Option<Session> },
    /// No usable session: send the visitor home to sign in.
    RedirectHome,
    /// Valid session that is not permitted.
    RedirectError(ErrorCode),
}

impl GuardDecision {
    /// Redirect target, if this decision redirects.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::Allow { .. } => None,
            GuardDecision::RedirectHome => Some(HOME_PATH.to_string()),
            GuardDecision::RedirectError(code) => Some(error_location(*code)),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow { .. })
    }
}

/// Build the error page URL for a reason code.
pub fn error_location(code: ErrorCode) -> String {
    format!("{AUTH_ERROR_PATH}?error={code}")
}

/// Result of checking a credential without regard to the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted(Session),
    Unauthenticated,
    Forbidden(Session),
}

/// Session validation plus domain policy.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    validator: SessionValidator,
    allow_list: AllowList,
}

impl RouteGuard {
    pub fn new(validator: SessionValidator, allow_list: AllowList) -> Self {
        Self {
            validator,
            allow_list,
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Check a credential against the validator and the allow-list.
    pub fn check(&self, credential: Option<&str>) -> Access {
        let Some(session) = credential.and_then(|token| self.validator.validate(token)) else {
            return Access::Unauthenticated;
        };

        if self.allow_list.is_allowed(&session.email) {
            Access::Granted(session)
        } else {
            Access::Forbidden(session)
        }
    }

    /// Decide what happens to a request for `path`.
    pub fn evaluate(&self, path: &str, credential: Option<&str>) -> GuardDecision {
        if classify(path) != PathClass::Protected {
            return GuardDecision::Allow { session: None };
        }

        match self.check(credential) {
            Access::Granted(session) => {
                tracing::debug!(path, subject = %session.subject, "Guard allowed request");
                GuardDecision::Allow {
                    session: Some(session),
                }
            }
            Access::Unauthenticated => {
                tracing::debug!(path, "No valid session, redirecting home");
                GuardDecision::RedirectHome
            }
            Access::Forbidden(session) => {
                tracing::warn!(
                    path,
                    email = %session.email,
                    allowed = %self.allow_list,
                    "Session email outside allowed domains"
                );
                GuardDecision::RedirectError(ErrorCode::AccessDenied)
            }
        }
    }
}
