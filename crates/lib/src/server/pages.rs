//! HTML page handlers.
//!
//! Protected pages read the [`Session`] the route guard attached, load the
//! representative's profile through the shared cache, and render it.

use axum::{
    Extension,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{ServerState, auth_routes::remove_session_cookie, extract::wants_refresh, templates};
use crate::{
    auth::Session,
    backend::{LeaderboardEntry, Operation, RepDetail},
    constants::HOME_PATH,
    guard::{Access, ErrorCode, credential_from},
    store::{AppState, Store, StoreError},
};

#[derive(Debug, Default, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub refresh: Option<String>,
}

/// Handler for GET / - landing page, or the dashboard when signed in
pub async fn home(
    State(state): State<ServerState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Response {
    let credential = credential_from(&cookies, &headers);
    if let Access::Granted(_) = state.guard.check(credential.as_deref()) {
        return Redirect::to("/dashboard").into_response();
    }
    Html(templates::home_page(state.guard.allow_list())).into_response()
}

/// Handler for GET /auth/error
pub async fn auth_error(
    State(state): State<ServerState>,
    Query(query): Query<ErrorQuery>,
) -> Html<String> {
    let code = query.error.as_deref().and_then(ErrorCode::parse);
    Html(templates::auth_error_page(code, state.guard.allow_list()))
}

/// Handler for unmatched paths
pub async fn not_found(uri: Uri) -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(templates::not_found_page(uri.path())),
    )
}

/// Load the profile, or produce the response for a failed load.
async fn load_profile(
    state: &ServerState,
    session: &Session,
    cookies: &Cookies,
    retry_path: &str,
) -> Result<AppState, Response> {
    let mut store = Store::new();
    match state.loader().load(&mut store, session).await {
        Ok(()) => Ok(store.into_state()),
        Err(err) => Err(load_failure(state, cookies, &err, retry_path)),
    }
}

fn load_failure(
    state: &ServerState,
    cookies: &Cookies,
    err: &StoreError,
    retry_path: &str,
) -> Response {
    if err.is_not_registered() {
        remove_session_cookie(state, cookies);
        return Redirect::to(HOME_PATH).into_response();
    }
    tracing::warn!(path = retry_path, error = %err, "Failed to load page data");
    upstream_failure(retry_path, &err.to_string())
}

fn upstream_failure(retry_path: &str, reason: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Html(templates::upstream_error_page(retry_path, reason)),
    )
        .into_response()
}

fn detail_or_default(app: &AppState) -> RepDetail {
    app.user.clone().unwrap_or_default()
}

/// Handler for GET /dashboard
pub async fn dashboard(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
) -> Response {
    let app = match load_profile(&state, &session, &cookies, "/dashboard").await {
        Ok(app) => app,
        Err(response) => return response,
    };
    Html(templates::dashboard_page(
        &session,
        &detail_or_default(&app),
        state.clock.now_utc(),
    ))
    .into_response()
}

/// Handler for GET /leaderboard
pub async fn leaderboard(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
    Query(search): Query<SearchQuery>,
) -> Response {
    let app = match load_profile(&state, &session, &cookies, "/leaderboard").await {
        Ok(app) => app,
        Err(response) => return response,
    };

    let loaded = if wants_refresh(search.refresh.as_deref()) {
        tracing::debug!(subject = %session.subject, "Refreshing leaderboard");
        state.cache.refresh(&Operation::Leaderboard).await
    } else {
        state.cache.get(&Operation::Leaderboard).await
    };
    let entries = match loaded {
        Ok(value) => match LeaderboardEntry::list_from(&value) {
            Ok(entries) => entries,
            Err(reason) => return upstream_failure("/leaderboard", &reason),
        },
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load leaderboard");
            return upstream_failure("/leaderboard", &err.to_string());
        }
    };

    Html(templates::leaderboard_page(
        &session,
        &entries,
        app.rep_name.as_deref(),
        search.q.as_deref(),
    ))
    .into_response()
}

/// Handler for GET /rules
pub async fn rules(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
) -> Response {
    if let Err(response) = load_profile(&state, &session, &cookies, "/rules").await {
        return response;
    }

    match state.cache.get(&Operation::Rules).await {
        Ok(rules) => Html(templates::rules_page(&session, &rules)).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load rules");
            upstream_failure("/rules", &err.to_string())
        }
    }
}

/// Handler for GET /achieved-logs
pub async fn achieved_logs(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
) -> Response {
    match load_profile(&state, &session, &cookies, "/achieved-logs").await {
        Ok(app) => {
            Html(templates::achieved_logs_page(&session, &detail_or_default(&app))).into_response()
        }
        Err(response) => response,
    }
}

/// Handler for GET /refund-logs
pub async fn refund_logs(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
) -> Response {
    match load_profile(&state, &session, &cookies, "/refund-logs").await {
        Ok(app) => {
            Html(templates::refund_logs_page(&session, &detail_or_default(&app))).into_response()
        }
        Err(response) => response,
    }
}
