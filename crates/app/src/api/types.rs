//! Backend API request and response types.
//!
//! The backend speaks camelCase JSON; every type here renames accordingly.

use serde::{Deserialize, Serialize};
use storefront::{
    checkout::ShippingForm,
    order::{OrderItem, PaymentMethod},
};

use crate::session::UserProfile;

/// Login credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,

    /// Account password.
    pub password: String,
}

/// Signup payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Display name.
    pub name: String,

    /// Account email.
    pub email: String,

    /// Account password.
    pub password: String,
}

/// Payload returned by login and signup: profile plus access token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    /// The signed-in user.
    pub user: UserProfile,

    /// Bearer token with an embedded expiry claim.
    pub access_token: String,
}

/// Gateway order minted by the backend for an online payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrder {
    /// Gateway order identifier, handed to the payment widget.
    pub order_id: String,

    /// Amount to collect, in minor currency units.
    pub amount: u64,

    /// ISO currency code.
    pub currency: String,
}

/// Payment confirmation forwarded verbatim to the verify endpoint,
/// alongside the full order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// Gateway payment identifier from the widget callback.
    pub payment_id: String,

    /// Gateway order identifier from the widget callback.
    pub order_id: String,

    /// Gateway signature from the widget callback.
    pub signature: String,

    /// Purchased lines.
    pub items: Vec<OrderItem>,

    /// Shipping destination.
    pub shipping_address: ShippingForm,

    /// Amount charged, in minor currency units.
    pub total_amount: u64,
}

/// Cash-on-delivery order creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodOrderRequest {
    /// Purchased lines.
    pub items: Vec<OrderItem>,

    /// Shipping destination.
    pub shipping_address: ShippingForm,

    /// Amount to collect at delivery, in minor currency units.
    pub total_amount: u64,

    /// Always [`PaymentMethod::Cod`]; serialized with its wire tag.
    pub payment_method: PaymentMethod,
}

/// Backend acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    /// Backend order identifier.
    pub order_id: String,

    /// Gateway payment identifier, when the order was prepaid.
    #[serde(default)]
    pub payment_id: Option<String>,
}
