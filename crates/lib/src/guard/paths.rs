//! Path classification for the route guard.

/// Path prefixes that require a valid, permitted session.
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/dashboard",
    "/leaderboard",
    "/rules",
    "/achieved-logs",
    "/refund-logs",
];

/// Path prefixes that bypass the guard entirely: sign-in endpoints, static
/// assets and the installable-app files.
pub const EXEMPT_PREFIXES: &[&str] = &[
    "/api/auth",
    "/assets",
    "/manifest.json",
    "/sw.js",
    "/icon-",
    "/favicon",
];

/// How the guard treats a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Always allowed, whatever the session state.
    Exempt,
    /// Not covered by any protected prefix.
    Public,
    /// Requires a valid session from an allowed domain.
    Protected,
}

/// Classify a request path.
///
/// Exemptions are checked first, then the protected prefixes. Matching is by
/// plain prefix, so `/rules-archive` is protected as well.
pub fn classify(path: &str) -> PathClass {
    if path == "/" || EXEMPT_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return PathClass::Exempt;
    }
    if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return PathClass::Protected;
    }
    PathClass::Public
}
