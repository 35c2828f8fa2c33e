//! JSON proxy for backend operations.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::Value;

use super::{ServerState, errors::ApiError, extract::{SessionUser, wants_refresh}};
use crate::backend::Operation;

#[derive(Debug, Default, Deserialize)]
pub struct OperationQuery {
    pub rep: Option<String>,
    /// `1` or `true` bypasses the cached value and refetches.
    pub refresh: Option<String>,
}

/// Handler for GET /api/{operation}
///
/// The session is checked before the operation name, so unauthenticated
/// callers learn nothing about which endpoints exist.
pub async fn dispatch(
    State(state): State<ServerState>,
    SessionUser(session): SessionUser,
    Path(name): Path<String>,
    Query(query): Query<OperationQuery>,
) -> Result<Json<Value>, ApiError> {
    let operation = Operation::from_endpoint(&name, query.rep.as_deref())?;
    let refresh = wants_refresh(query.refresh.as_deref());
    tracing::debug!(%operation, subject = %session.subject, refresh, "API request");

    let result = if refresh {
        state.cache.refresh(&operation).await
    } else {
        state.cache.get(&operation).await
    };
    match result {
        Ok(value) => Ok(Json(Value::clone(&value))),
        Err(err) => {
            tracing::warn!(%operation, attempts = err.attempts, error = %err.source_error(), "API upstream failure");
            Err(ApiError::Upstream(err.source_error().details()))
        }
    }
}

/// Fallback for every method other than GET on /api/{operation}
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
