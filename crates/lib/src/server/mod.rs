//! HTTP server: shared state, router and handlers.
//!
//! Layer order matters. The cookie manager is outermost so the route guard
//! can read the session cookie, and the guard wraps every route including the
//! fallback, so unknown paths under a protected prefix are still guarded.

pub mod api;
pub mod auth_routes;
pub mod errors;
pub mod extract;
pub mod pages;
pub mod templates;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::get,
};
use serde::Serialize;
use tower_cookies::{Cookie, CookieManagerLayer, cookie::SameSite};

use crate::{
    auth::{SessionIssuer, SessionValidator},
    backend::{AppsScriptClient, BackendCache, DataSource, backend_cache},
    clock::Clock,
    config::{Config, SessionConfig},
    constants::SESSION_COOKIE,
    guard::{RouteGuard, route_guard},
    store::ProfileLoader,
};

pub use errors::ApiError;
pub use extract::SessionUser;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub guard: Arc<RouteGuard>,
    pub cache: BackendCache,
    pub clock: Arc<dyn Clock>,
}

impl ServerState {
    pub fn new(config: Config, source: Arc<dyn DataSource>, clock: Arc<dyn Clock>) -> Self {
        let validator = SessionValidator::new(&config.session.secret, Arc::clone(&clock));
        let guard = RouteGuard::new(validator, config.allow_list.clone());
        let cache = backend_cache(source, &config.cache, Arc::clone(&clock));

        Self {
            config: Arc::new(config),
            guard: Arc::new(guard),
            cache,
            clock,
        }
    }

    /// State backed by the Apps Script web app named in `config`.
    pub fn connect(config: Config, clock: Arc<dyn Clock>) -> crate::Result<Self> {
        let client = AppsScriptClient::new(&config.backend)?;
        Ok(Self::new(config, Arc::new(client), clock))
    }

    /// Issuer sharing this server's secret, max age and allow-list.
    pub fn issuer(&self) -> SessionIssuer {
        SessionIssuer::new(
            &self.config.session.secret,
            self.config.session.max_age,
            self.config.allow_list.clone(),
            Arc::clone(&self.clock),
        )
    }

    pub fn loader(&self) -> ProfileLoader {
        ProfileLoader::new(self.cache.clone())
    }

    /// Session cookie carrying `token`, with this server's attributes.
    pub fn session_cookie(&self, token: impl Into<String>) -> Cookie<'static> {
        session_cookie(&self.config.session, token)
    }
}

/// Session cookie carrying `token`.
///
/// Removal expires a cookie built here with an empty token, so both carry the
/// same attributes.
pub fn session_cookie(config: &SessionConfig, token: impl Into<String>) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.into()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(time::Duration::try_from(config.max_age).unwrap_or(time::Duration::MAX))
        .build()
}

/// Build the application router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/health", get(health))
        .route("/auth/error", get(pages::auth_error))
        .route("/dashboard", get(pages::dashboard))
        .route("/leaderboard", get(pages::leaderboard))
        .route("/rules", get(pages::rules))
        .route("/achieved-logs", get(pages::achieved_logs))
        .route("/refund-logs", get(pages::refund_logs))
        .route("/api/auth/session", get(auth_routes::session))
        .route(
            "/api/auth/signout",
            get(auth_routes::signout).post(auth_routes::signout),
        )
        .route(
            "/api/{operation}",
            get(api::dispatch).fallback(api::method_not_allowed),
        )
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.guard),
            route_guard,
        ))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cached_entries: usize,
    pub upstream_fetches: u64,
}

/// Handler for GET /health
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        cached_entries: state.cache.len(),
        upstream_fetches: state.cache.fetch_count(),
    })
}
