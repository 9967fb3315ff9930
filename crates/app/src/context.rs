//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    api::{ApiError, BackendApi, BackendConfig, HttpBackend},
    checkout::CheckoutDeps,
    config::AppConfig,
    payment::{CodPayment, OnlinePayment, PaymentWidget, WidgetDisplay},
    session::{SessionError, SessionHandle, SessionTracker},
    store::{JsonFileStore, StateStore},
};

/// Errors that can occur while building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The backend HTTP client could not be built.
    #[error("failed to initialize backend client")]
    Api(#[from] ApiError),

    /// The persisted session mirror could not be read.
    #[error("failed to load persisted session")]
    Session(#[from] SessionError),
}

/// Shared application wiring: config, backend client, state store, and the
/// session handle.
#[derive(Clone)]
pub struct AppContext {
    /// Loaded configuration.
    pub config: AppConfig,

    /// The backend REST API.
    pub api: Arc<dyn BackendApi>,

    /// Persisted client state.
    pub store: Arc<dyn StateStore>,

    /// The current session.
    pub session: SessionHandle,
}

impl AppContext {
    /// Build the application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built or the
    /// persisted session cannot be read.
    pub fn from_config(config: AppConfig) -> Result<Self, AppInitError> {
        let api = Arc::new(HttpBackend::new(BackendConfig {
            base_url: config.api_base_url.clone(),
        })?);

        let store: Arc<dyn StateStore> = Arc::new(JsonFileStore::new(config.state_file.clone()));

        let session = SessionHandle::load(store.clone())?;

        Ok(Self {
            config,
            api,
            store,
            session,
        })
    }

    /// Spawn the token-expiry tracker for this session. The tracker stops
    /// when dropped.
    #[must_use]
    pub fn spawn_session_tracker(&self) -> SessionTracker {
        SessionTracker::spawn(
            self.session.clone(),
            Duration::from_secs(self.config.session_poll_secs),
        )
    }

    /// Checkout wiring over the given payment widget implementation.
    #[must_use]
    pub fn checkout_deps(&self, widget: Arc<dyn PaymentWidget>) -> CheckoutDeps {
        let display = WidgetDisplay {
            name: self.config.shop_name.clone(),
            description: self.config.shop_tagline.clone(),
        };

        CheckoutDeps {
            online: OnlinePayment::new(self.api.clone(), widget, self.session.clone(), display),
            cod: CodPayment::new(self.api.clone(), self.session.clone()),
            session: self.session.clone(),
            store: self.store.clone(),
            cod_surcharge: self.config.cod_shipping_fee,
        }
    }
}
