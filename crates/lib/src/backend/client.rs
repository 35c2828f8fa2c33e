//! HTTP client for the Apps Script web app.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{errors::BackendError, operation::Operation};
use crate::config::BackendConfig;

/// Anything that can answer backend operations.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    async fn fetch(&self, operation: &Operation) -> Result<Value, BackendError>;
}

/// Calls a deployed Apps Script `exec` URL.
///
/// Every operation is a GET on the same base URL with an `action` query
/// parameter, plus `rep` where the operation needs one.
#[derive(Debug, Clone)]
pub struct AppsScriptClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AppsScriptClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| BackendError::Client { source })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The full request URL for an operation.
    pub fn url_for(&self, operation: &Operation) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", operation.action());
            if let Some(rep) = operation.rep() {
                query.append_pair("rep", rep);
            }
        }
        url
    }
}

#[async_trait]
impl DataSource for AppsScriptClient {
    async fn fetch(&self, operation: &Operation) -> Result<Value, BackendError> {
        let url = self.url_for(operation);
        tracing::debug!(%operation, "Calling backend");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| BackendError::Request {
                operation: operation.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| BackendError::Request {
                operation: operation.to_string(),
                source,
            })?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| BackendError::Decode {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?;

        match upstream_error(operation, &value) {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }
}

/// Detect an error reported in-band as `{"error": ..., "details": ...}`.
///
/// Apps Script cannot set a status code, so failures arrive with HTTP 200.
pub fn upstream_error(operation: &Operation, body: &Value) -> Option<BackendError> {
    let object = body.as_object()?;
    let message = match object.get("error")? {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let details = object.get("details").and_then(|details| match details {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });

    Some(BackendError::Upstream {
        operation: operation.to_string(),
        message,
        details,
    })
}
