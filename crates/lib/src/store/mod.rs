//! Per-request application state.
//!
//! State changes only through [`Store::dispatch`], which runs the pure
//! [`reduce`] function. Nothing here is shared between requests; the shared
//! part (backend data) lives in the [`BackendCache`](crate::backend::BackendCache).

mod errors;
pub use errors::StoreError;

mod loader;
pub use loader::ProfileLoader;

use crate::{
    auth::normalize_email,
    backend::{RepDetail, UserRecord},
};

/// Everything a page needs to know about the signed-in representative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Rows of the users sheet.
    pub users: Vec<UserRecord>,
    /// Detail record of the signed-in representative, once loaded.
    pub user: Option<RepDetail>,
    /// Representative name taken from the detail record.
    pub rep_name: Option<String>,
}

/// State transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetUsers(Vec<UserRecord>),
    SetUserDetail(Option<RepDetail>),
    /// Forget everything.
    SignedOut,
}

/// Apply `action` to `state`.
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        Action::SetUsers(users) => AppState { users, ..state },
        Action::SetUserDetail(user) => {
            let rep_name = user
                .as_ref()
                .map(|detail| detail.rep.trim().to_string())
                .filter(|rep| !rep.is_empty());
            AppState {
                user,
                rep_name,
                ..state
            }
        }
        Action::SignedOut => AppState::default(),
    }
}

/// Owner of an [`AppState`].
#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn into_state(self) -> AppState {
        self.state
    }
}

/// Find the user row whose email matches `email`, ignoring case and
/// surrounding whitespace. An empty email matches nothing.
pub fn resolve_rep<'a>(users: &'a [UserRecord], email: &str) -> Option<&'a UserRecord> {
    let email = normalize_email(email);
    if email.is_empty() {
        return None;
    }
    users.iter().find(|user| user.normalized_email() == email)
}
