//! Signed session tokens.
//!
//! Tokens are HS256 JWTs signed with the shared session secret. Expiry is
//! checked against the injected [`Clock`] rather than the system time seen by
//! `jsonwebtoken`.

use std::{collections::HashSet, fmt, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use super::{errors::AuthError, policy::AllowList};
use crate::clock::Clock;

/// Claims carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity provider subject identifier.
    pub sub: String,
    /// Email address of the signed-in account. Absent for some providers.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// A verified session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub subject: String,
    /// Email as carried in the token; empty when the token had none.
    pub email: String,
    pub name: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email.unwrap_or_default(),
            name: claims.name,
            issued_at: DateTime::from_timestamp(claims.iat, 0).unwrap_or_default(),
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
        }
    }
}

/// Verifies session tokens.
#[derive(Clone)]
pub struct SessionValidator {
    key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl SessionValidator {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "sub".to_string()]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Verify a token, reporting why it was rejected.
    pub fn verify(&self, token: &str) -> Result<Session, AuthError> {
        let data = decode::<SessionClaims>(token.trim(), &self.key, &self.validation).map_err(
            |source| match source.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken { source },
            },
        )?;

        let claims = data.claims;
        if claims.exp <= self.clock.now_secs() {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
            });
        }

        Ok(claims.into())
    }

    /// Verify a token, treating every failure as "no session".
    pub fn validate(&self, token: &str) -> Option<Session> {
        match self.verify(token) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                None
            }
        }
    }
}

impl fmt::Debug for SessionValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionValidator")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Signs new session tokens.
///
/// Mirrors the sign-in gate: accounts outside the allow-list never receive a
/// token.
#[derive(Clone)]
pub struct SessionIssuer {
    key: EncodingKey,
    max_age: Duration,
    allow_list: AllowList,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    pub fn new(
        secret: &str,
        max_age: Duration,
        allow_list: AllowList,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            max_age,
            allow_list,
            clock,
        }
    }

    /// Issue a token for an account.
    pub fn issue(
        &self,
        subject: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<String, AuthError> {
        if !self.allow_list.is_allowed(email) {
            tracing::info!(
                email,
                allowed = %self.allow_list,
                "Refusing to issue session outside allowed domains"
            );
            return Err(AuthError::DomainNotAllowed {
                email: email.to_string(),
            });
        }

        let now = self.clock.now_secs();
        let max_age_secs = self.max_age.as_secs();
        let exp = i64::try_from(max_age_secs)
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or(AuthError::LifetimeOutOfRange { max_age_secs })?;
        let claims = SessionClaims {
            sub: subject.to_string(),
            email: Some(email.trim().to_string()),
            name: name.map(str::to_string),
            iat: now,
            exp,
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims without any policy check.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|source| AuthError::Signing { source })
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("max_age", &self.max_age)
            .field("allow_list", &self.allow_list)
            .finish_non_exhaustive()
    }
}
