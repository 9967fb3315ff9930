//! Authentication operations.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{
        ApiError, BackendApi,
        types::{Credentials, SignupRequest},
    },
    session::{Session, SessionError, SessionHandle, UserProfile},
};

/// Errors surfaced by authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Session bookkeeping failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Login, signup, password recovery, and session refresh.
pub struct AuthService {
    api: Arc<dyn BackendApi>,
    session: SessionHandle,
}

impl AuthService {
    /// Create the service over the given backend and session handle.
    #[must_use]
    pub fn new(api: Arc<dyn BackendApi>, session: SessionHandle) -> Self {
        Self { api, session }
    }

    /// Sign in and store the resulting session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the backend rejects the credentials
    /// or the session cannot be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let payload = self
            .api
            .login(&Credentials {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .await?;

        let profile = payload.user.clone();

        self.session.sign_in(Session {
            user: payload.user,
            access_token: payload.access_token,
        })?;

        info!(user = %profile.email, "signed in");

        Ok(profile)
    }

    /// Create an account and store the resulting session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the backend rejects the signup or the
    /// session cannot be stored.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let payload = self
            .api
            .signup(&SignupRequest {
                name: name.to_owned(),
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .await?;

        let profile = payload.user.clone();

        self.session.sign_in(Session {
            user: payload.user,
            access_token: payload.access_token,
        })?;

        info!(user = %profile.email, "account created");

        Ok(profile)
    }

    /// Request a password-reset email. Returns the backend message.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the backend call fails.
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthError> {
        Ok(self.api.forgot_password(email).await?)
    }

    /// Complete a password reset with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the backend rejects the token.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<String, AuthError> {
        Ok(self.api.reset_password(token, password).await?)
    }

    /// Recover an expired session by minting a new access token.
    ///
    /// On any failure the session is cleared and the customer must sign in
    /// again; a half-recovered session is never left behind.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] carrying the refresh failure.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        match self.api.refresh().await {
            Ok(access_token) => {
                self.session.apply_refreshed_token(access_token)?;

                Ok(())
            }
            Err(error) => {
                warn!(%error, "session refresh failed; signing out");
                self.session.sign_out()?;

                Err(AuthError::Api(error))
            }
        }
    }

    /// Sign out locally. No backend call is made.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the session mirror cannot be cleared.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.sign_out()?;
        info!("signed out");

        Ok(())
    }
}
