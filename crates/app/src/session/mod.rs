//! Session state and expiry tracking.

pub mod token;
mod tracker;

pub use tracker::SessionTracker;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::store::{self, StateStore, StoreError, keys};

/// Errors related to session bookkeeping.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Mirroring the session to or from the state store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A signed-in user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend user identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Account email.
    pub email: String,
}

/// A signed-in session: profile plus the current access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The signed-in user.
    pub user: UserProfile,

    /// Bearer token with an embedded expiry claim.
    pub access_token: String,
}

/// Broadcast session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session; the customer must sign in.
    SignedOut,

    /// A session with a live access token.
    Active,

    /// The access token expired. Rendered as a blocking, non-dismissable
    /// re-auth prompt; only a refresh or sign-out resolves it.
    Expired,
}

/// Shared handle to the current session.
///
/// Holds the session in memory, mirrors it to the state store under
/// [`keys::USER`], and broadcasts lifecycle changes over a watch channel.
/// Cloning shares the same underlying session.
#[derive(Clone)]
pub struct SessionHandle {
    current: Arc<Mutex<Option<Session>>>,
    store: Arc<dyn StateStore>,
    state: watch::Sender<SessionState>,
}

impl SessionHandle {
    /// Load the persisted session mirror, if any.
    ///
    /// A persisted session starts `Active` even when its token has already
    /// expired; the expiry tracker flags it on its first tick.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the store cannot be read.
    pub fn load(store: Arc<dyn StateStore>) -> Result<Self, SessionError> {
        let persisted: Option<Session> = store::get_typed(store.as_ref(), keys::USER)?;

        let initial = if persisted.is_some() {
            SessionState::Active
        } else {
            SessionState::SignedOut
        };

        let (state, _receiver) = watch::channel(initial);

        Ok(Self {
            current: Arc::new(Mutex::new(persisted)),
            store,
            state,
        })
    }

    /// Store a freshly authenticated session and broadcast `Active`.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the mirror cannot be written.
    pub fn sign_in(&self, session: Session) -> Result<(), SessionError> {
        store::put_typed(self.store.as_ref(), keys::USER, &session)?;

        *self.lock() = Some(session);
        self.state.send_replace(SessionState::Active);

        Ok(())
    }

    /// The signed-in session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// The current access token, if signed in.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribe to lifecycle changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// A bearer token usable for an authenticated call right now.
    ///
    /// Returns `None` when signed out, or when the token has expired — in
    /// which case the expiry is flagged so the blocking re-auth prompt
    /// appears. An expired token is never handed out.
    #[must_use]
    pub fn bearer_for_call(&self, now: Timestamp) -> Option<String> {
        let bearer = self.access_token()?;

        if token::is_expired(&bearer, now) {
            self.mark_expired();

            return None;
        }

        Some(bearer)
    }

    /// Flag the session expired. Only an `Active` session can expire.
    pub fn mark_expired(&self) {
        if *self.state.borrow() == SessionState::Active {
            warn!("access token expired; session locked pending refresh");
            self.state.send_replace(SessionState::Expired);
        }
    }

    /// Swap in a refreshed access token and broadcast `Active`. A no-op
    /// when signed out.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the mirror cannot be written.
    pub fn apply_refreshed_token(&self, access_token: String) -> Result<(), SessionError> {
        let mut guard = self.lock();

        if let Some(session) = guard.as_mut() {
            session.access_token = access_token;
            store::put_typed(self.store.as_ref(), keys::USER, session)?;
            self.state.send_replace(SessionState::Active);
            info!("access token refreshed");
        }

        Ok(())
    }

    /// Clear the session everywhere and broadcast `SignedOut`. Used for
    /// logout and for a 401 from any backend endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the mirror cannot be removed.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.store.remove(keys::USER)?;

        *self.lock() = None;
        self.state.send_replace(SessionState::SignedOut);

        Ok(())
    }

    /// One expiry check: flags `Expired` once the token's claim has passed.
    pub(crate) fn check_expiry(&self, now: Timestamp) {
        if *self.state.borrow() != SessionState::Active {
            return;
        }

        let expired = self
            .access_token()
            .as_deref()
            .map_or(true, |bearer| token::is_expired(bearer, now));

        if expired {
            self.mark_expired();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
