//! Wishlist operations.
//!
//! The wishlist page itself is rendered elsewhere; these are the two
//! authenticated operations it calls, riding the same bearer-token and
//! 401 rules as every other backend call.

use std::sync::Arc;

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    api::{ApiError, BackendApi},
    session::SessionHandle,
};

/// Errors surfaced by wishlist operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// No usable session; the caller sends the customer to login.
    #[error("session is not authenticated")]
    Unauthorized,

    /// A non-auth backend failure.
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for WishlistError {
    fn from(error: ApiError) -> Self {
        if matches!(error, ApiError::Unauthorized) {
            return Self::Unauthorized;
        }

        Self::Api(error)
    }
}

/// Fetch and toggle wishlist entries.
pub struct WishlistService {
    api: Arc<dyn BackendApi>,
    session: SessionHandle,
}

impl WishlistService {
    /// Create the service.
    #[must_use]
    pub fn new(api: Arc<dyn BackendApi>, session: SessionHandle) -> Self {
        Self { api, session }
    }

    /// The wishlisted product ids.
    ///
    /// # Errors
    ///
    /// Returns a [`WishlistError`]; `Unauthorized` means the customer must
    /// sign in again.
    pub async fn fetch(&self) -> Result<Vec<String>, WishlistError> {
        let bearer = self.bearer()?;

        self.api
            .wishlist(&bearer)
            .await
            .map_err(|error| self.note_unauthorized(error))
    }

    /// Add or remove a product; returns the new list.
    ///
    /// # Errors
    ///
    /// Returns a [`WishlistError`]; `Unauthorized` means the customer must
    /// sign in again.
    pub async fn toggle(&self, product_id: &str) -> Result<Vec<String>, WishlistError> {
        let bearer = self.bearer()?;

        self.api
            .toggle_wishlist(&bearer, product_id)
            .await
            .map_err(|error| self.note_unauthorized(error))
    }

    fn bearer(&self) -> Result<String, WishlistError> {
        self.session
            .bearer_for_call(Timestamp::now())
            .ok_or(WishlistError::Unauthorized)
    }

    fn note_unauthorized(&self, error: ApiError) -> WishlistError {
        if matches!(error, ApiError::Unauthorized) {
            // Best-effort: the error being surfaced matters more than the mirror.
            let _cleared = self.session.sign_out();
        }

        error.into()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        api::MockBackendApi,
        session::SessionState,
        store::MemoryStore,
        test::{expired_session, live_session},
    };

    use super::*;

    fn handle() -> SessionHandle {
        SessionHandle::load(Arc::new(MemoryStore::new())).expect("load should succeed")
    }

    #[tokio::test]
    async fn toggle_returns_the_new_list() -> TestResult {
        let mut api = MockBackendApi::new();

        api.expect_toggle_wishlist()
            .returning(|_bearer, _product_id| Ok(vec!["p-1".to_owned()]));

        let session = handle();
        session.sign_in(live_session())?;

        let wishlist = WishlistService::new(Arc::new(api), session);

        assert_eq!(wishlist.toggle("p-1").await?, vec!["p-1".to_owned()]);

        Ok(())
    }

    #[tokio::test]
    async fn an_expired_token_never_reaches_the_network() -> TestResult {
        // No expectations: any call would panic the mock.
        let api = MockBackendApi::new();

        let session = handle();
        session.sign_in(expired_session())?;

        let wishlist = WishlistService::new(Arc::new(api), session.clone());

        let result = wishlist.fetch().await;

        assert!(
            matches!(result, Err(WishlistError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );
        assert_eq!(session.state(), SessionState::Expired);

        Ok(())
    }

    #[tokio::test]
    async fn a_401_clears_the_session() -> TestResult {
        let mut api = MockBackendApi::new();

        api.expect_wishlist()
            .returning(|_bearer| Err(ApiError::Unauthorized));

        let session = handle();
        session.sign_in(live_session())?;

        let wishlist = WishlistService::new(Arc::new(api), session.clone());

        let result = wishlist.fetch().await;

        assert!(
            matches!(result, Err(WishlistError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );
        assert_eq!(session.state(), SessionState::SignedOut);

        Ok(())
    }
}
