//! Loads the signed-in representative's profile into a [`Store`].

use super::{Action, Store, StoreError, resolve_rep};
use crate::{
    auth::Session,
    backend::{BackendCache, Operation, RepDetail, UserRecord},
};

/// Drives users -> rep resolution -> rep detail, dispatching as it goes.
///
/// Both backend reads go through the shared cache, so a page load normally
/// costs no upstream calls at all.
#[derive(Debug, Clone)]
pub struct ProfileLoader {
    cache: BackendCache,
}

impl ProfileLoader {
    pub fn new(cache: BackendCache) -> Self {
        Self { cache }
    }

    /// Load users, resolve the session's rep, then load that rep's detail.
    ///
    /// When the session email matches no user row the store is reset with
    /// [`Action::SignedOut`] and [`StoreError::NotRegistered`] is returned.
    pub async fn load(&self, store: &mut Store, session: &Session) -> Result<(), StoreError> {
        let users = self.cache.get(&Operation::Users).await?;
        let users = UserRecord::list_from(&users).map_err(|reason| StoreError::Decode {
            operation: Operation::Users.to_string(),
            reason,
        })?;
        store.dispatch(Action::SetUsers(users));

        let Some(rep) = resolve_rep(&store.state().users, &session.email)
            .map(|user| user.rep.trim().to_string())
            .filter(|rep| !rep.is_empty())
        else {
            tracing::info!(email = %session.email, "No representative for session email");
            store.dispatch(Action::SignedOut);
            return Err(StoreError::NotRegistered {
                email: session.email.clone(),
            });
        };

        let operation = Operation::UserDetail { rep };
        let detail = self.cache.get(&operation).await?;
        let detail = RepDetail::from_response(&detail).map_err(|reason| StoreError::Decode {
            operation: operation.to_string(),
            reason,
        })?;
        store.dispatch(Action::SetUserDetail(detail));

        Ok(())
    }
}
