//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_cookies::Cookies;

use super::{ServerState, errors::ApiError};
use crate::{
    auth::Session,
    guard::{Access, credential_from},
};

/// A verified session from an allowed domain.
///
/// Reuses the session the route guard attached, when there is one. Otherwise
/// the credential is checked here, rejecting with 401 when there is no valid
/// session and 403 when the domain is not allowed.
#[derive(Debug, Clone)]
pub struct SessionUser(pub Session);

impl FromRequestParts<ServerState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(SessionUser(session.clone()));
        }

        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized)?;
        let credential = credential_from(&cookies, &parts.headers);

        match state.guard.check(credential.as_deref()) {
            Access::Granted(session) => Ok(SessionUser(session)),
            Access::Unauthenticated => Err(ApiError::Unauthorized),
            Access::Forbidden(session) => {
                tracing::warn!(email = %session.email, "API request from disallowed domain");
                Err(ApiError::Forbidden)
            }
        }
    }
}

/// Whether a `refresh` query value asks to bypass the cache.
pub fn wants_refresh(flag: Option<&str>) -> bool {
    matches!(
        flag.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}
