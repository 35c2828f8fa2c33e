//! Health check command - checks a running Squad server.

use std::{fmt, time::Duration};

use serde_json::Value;

use crate::cli::HealthArgs;

/// Why a server failed its health check.
pub enum Unhealthy {
    Unreachable { url: String, reason: String },
    HttpStatus(reqwest::StatusCode),
    Status(String),
    InvalidBody(String),
}

impl fmt::Display for Unhealthy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unhealthy::Unreachable { url, reason } => {
                write!(f, "unhealthy: failed to connect to {url}: {reason}")
            }
            Unhealthy::HttpStatus(status) => {
                write!(f, "unhealthy: server returned HTTP status {status}")
            }
            Unhealthy::Status(status) => write!(f, "unhealthy: server returned status {status:?}"),
            Unhealthy::InvalidBody(reason) => {
                write!(f, "unhealthy: unreadable health response: {reason}")
            }
        }
    }
}

// `main` reports errors through Debug, so keep the message readable there.
impl fmt::Debug for Unhealthy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Unhealthy {}

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("http://{}:{}/health", args.host, args.port);
    let body = check(&url, Duration::from_secs(args.timeout)).await?;
    println!("healthy: {body}");
    Ok(())
}

/// Fetch `url` and require `{"status": "healthy"}`.
pub async fn check(url: &str, timeout: Duration) -> Result<Value, Unhealthy> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Unhealthy::Unreachable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Unhealthy::Unreachable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    if !response.status().is_success() {
        return Err(Unhealthy::HttpStatus(response.status()));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| Unhealthy::InvalidBody(e.to_string()))?;
    match body.get("status").and_then(Value::as_str) {
        Some("healthy") => Ok(body),
        other => Err(Unhealthy::Status(other.unwrap_or_default().to_string())),
    }
}
