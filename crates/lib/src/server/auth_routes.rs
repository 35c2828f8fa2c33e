//! Session endpoints under /api/auth.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::Redirect,
};
use serde_json::{Value, json};
use tower_cookies::Cookies;

use super::ServerState;
use crate::{
    constants::{HOME_PATH, SESSION_COOKIE},
    guard::{Access, credential_from},
};

/// Handler for GET /api/auth/session
///
/// Returns `{"user": {...}, "expires": ...}` for a valid session from an
/// allowed domain and `{}` otherwise.
pub async fn session(
    State(state): State<ServerState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Json<Value> {
    let credential = credential_from(&cookies, &headers);
    match state.guard.check(credential.as_deref()) {
        Access::Granted(session) => Json(json!({
            "user": {
                "name": session.name,
                "email": session.email,
            },
            "expires": session.expires_at.to_rfc3339(),
        })),
        Access::Unauthenticated | Access::Forbidden(_) => Json(json!({})),
    }
}

/// Handler for GET and POST /api/auth/signout
pub async fn signout(State(state): State<ServerState>, cookies: Cookies) -> Redirect {
    remove_session_cookie(&state, &cookies);
    Redirect::to(HOME_PATH)
}

/// Expire the session cookie on the client.
pub fn remove_session_cookie(state: &ServerState, cookies: &Cookies) {
    if cookies.get(SESSION_COOKIE).is_some() {
        tracing::debug!("Removing session cookie");
    }
    cookies.remove(state.session_cookie(""));
}
