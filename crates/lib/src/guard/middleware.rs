//! axum middleware applying the route guard.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use super::{GuardDecision, RouteGuard};
use crate::constants::{HOME_PATH, SESSION_COOKIE};

/// Pull the session token out of the cookie jar, falling back to an
/// `Authorization: Bearer` header.
pub fn credential_from(cookies: &Cookies, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Guard layer. Must sit inside a `CookieManagerLayer`.
///
/// Allowed requests on protected paths get the verified
/// [`Session`](crate::auth::Session) inserted into their extensions.
pub async fn route_guard(
    State(guard): State<Arc<RouteGuard>>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let credential = credential_from(&cookies, request.headers());

    match guard.evaluate(request.uri().path(), credential.as_deref()) {
        GuardDecision::Allow { session } => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        decision => {
            let location = decision.location().unwrap_or_else(|| HOME_PATH.to_string());
            Redirect::temporary(&location).into_response()
        }
    }
}
