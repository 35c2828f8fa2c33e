//! Domain allow-list policy.
//!
//! Admission is a suffix check of the normalized email against `@{domain}`
//! for each configured domain.

use std::fmt;

use crate::constants::DEFAULT_ALLOWED_DOMAIN;

/// The set of email domains admitted to the dashboard.
///
/// Immutable once built. Never empty: when configuration yields no usable
/// domain the built-in default is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    domains: Vec<String>,
}

impl AllowList {
    /// Build an allow-list from individual domain names.
    ///
    /// Entries are trimmed, lowercased and stripped of a leading `@`. Empty
    /// entries are dropped.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for domain in domains {
            let domain = domain.as_ref().trim().trim_start_matches('@').to_lowercase();
            if !domain.is_empty() && !normalized.contains(&domain) {
                normalized.push(domain);
            }
        }

        if normalized.is_empty() {
            return Self::default();
        }
        Self {
            domains: normalized,
        }
    }

    /// Parse a comma-separated list such as `"cronberry.com, maaruji.com"`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// The normalized domains, in configuration order.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Check whether `email` belongs to one of the allowed domains.
    pub fn is_allowed(&self, email: &str) -> bool {
        is_allowed(email, self)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            domains: vec![DEFAULT_ALLOWED_DOMAIN.to_string()],
        }
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.domains.join(", "))
    }
}

/// Lowercase and trim an email address for comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Decide admission for `email`.
///
/// Empty addresses and addresses with an empty local part are refused.
pub fn is_allowed(email: &str, allow_list: &AllowList) -> bool {
    let email = normalize_email(email);
    if email.is_empty() {
        return false;
    }

    allow_list.domains.iter().any(|domain| {
        email
            .strip_suffix(domain.as_str())
            .and_then(|rest| rest.strip_suffix('@'))
            .is_some_and(|local| !local.is_empty())
    })
}
