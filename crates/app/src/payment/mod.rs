//! Payment adapters.
//!
//! Two mutually exclusive submission paths: [`OnlinePayment`] drives the
//! hosted gateway widget and the server-side verify callback, while
//! [`CodPayment`] places the order directly for collection at delivery.
//! Both require a live access token before any network call, and both only
//! ever build an [`storefront::order::Order`] from a backend-confirmed
//! response.

mod cod;
mod online;

pub use cod::CodPayment;
pub use online::OnlinePayment;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use thiserror::Error;

use storefront::{
    checkout::ShippingForm,
    order::{Order, OrderItem, PaymentMethod},
};

use crate::{
    api::{ApiError, types::PlacedOrder},
    session::SessionHandle,
};

/// Order details handed to the hosted payment widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOrder {
    /// Gateway order identifier minted by the backend.
    pub order_id: String,

    /// Amount to collect, in minor currency units.
    pub amount: u64,

    /// ISO currency code.
    pub currency: String,

    /// Display name shown on the widget.
    pub name: String,

    /// Description line shown on the widget.
    pub description: String,
}

/// Fixed display strings shown on the hosted widget.
#[derive(Debug, Clone)]
pub struct WidgetDisplay {
    /// Display name.
    pub name: String,

    /// Description line.
    pub description: String,
}

/// Confirmation payload the widget returns on success, forwarded verbatim
/// to the verify endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfirmation {
    /// Gateway payment identifier.
    pub payment_id: String,

    /// Gateway order identifier.
    pub order_id: String,

    /// Gateway signature over the payment.
    pub signature: String,
}

/// Errors the widget can report.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The customer closed the widget without paying. The only
    /// cancellation path; the flow must become interactive again.
    #[error("payment window was dismissed")]
    Dismissed,

    /// The gateway reported a failure, with its message when available.
    #[error("payment failed: {0}")]
    Gateway(String),
}

/// The hosted checkout widget as an awaitable operation.
///
/// Implementations own the gateway SDK, including loading its script
/// lazily (a no-op when already present), and resolve with the one-shot
/// callback payload. The widget runs isolated; this trait is the only
/// contact surface.
#[automock]
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    /// Open the widget for the given order and wait for its outcome.
    async fn collect(&self, order: &WidgetOrder) -> Result<WidgetConfirmation, WidgetError>;
}

/// Errors surfaced by the payment adapters.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// No usable session: signed out, token expired, or the backend
    /// returned 401 (in which case the session has already been cleared).
    /// The caller sends the customer to login.
    #[error("session is not authenticated")]
    Unauthorized,

    /// A non-auth backend failure.
    #[error(transparent)]
    Api(ApiError),

    /// The widget failed or was dismissed.
    #[error(transparent)]
    Widget(#[from] WidgetError),
}

impl From<ApiError> for PaymentError {
    fn from(error: ApiError) -> Self {
        if matches!(error, ApiError::Unauthorized) {
            return Self::Unauthorized;
        }

        Self::Api(error)
    }
}

/// Fetch a bearer token usable right now, refusing the call otherwise.
fn authorized_bearer(session: &SessionHandle) -> Result<String, PaymentError> {
    session
        .bearer_for_call(Timestamp::now())
        .ok_or(PaymentError::Unauthorized)
}

/// Apply the universal 401 rule: the session is cleared before the error
/// surfaces, so every caller redirects to login instead of retrying.
fn unauthorized_clears_session(session: &SessionHandle, error: ApiError) -> PaymentError {
    if matches!(error, ApiError::Unauthorized) {
        // Best-effort: the error being surfaced matters more than the mirror.
        let _cleared = session.sign_out();
    }

    error.into()
}

/// Build the confirmed order from the backend acknowledgement and the
/// submitted payload.
fn confirmed_order(
    placed: PlacedOrder,
    fallback_payment_id: Option<String>,
    items: Vec<OrderItem>,
    shipping_address: ShippingForm,
    total_amount: u64,
    payment_method: PaymentMethod,
) -> Order {
    Order {
        order_id: placed.order_id,
        payment_id: placed.payment_id.or(fallback_payment_id),
        items,
        shipping_address,
        total_amount,
        payment_method,
        created_at: Timestamp::now(),
    }
}
