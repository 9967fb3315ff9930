//! Order model.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{cart::CartItem, checkout::form::ShippingForm};

/// How an order is paid for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Prepaid through the hosted payment gateway.
    #[default]
    #[serde(rename = "Online")]
    Online,

    /// Cash on delivery.
    #[serde(rename = "COD")]
    Cod,
}

impl PaymentMethod {
    /// The tag the backend API uses for this method.
    #[must_use]
    pub const fn wire_tag(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Cod => "COD",
        }
    }

    /// Whether payment is collected at delivery.
    #[must_use]
    pub const fn is_cod(self) -> bool {
        matches!(self, Self::Cod)
    }
}

/// A purchased line, snapshotted from the cart at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Backend product identifier.
    pub product_id: String,

    /// Display name at purchase time.
    pub name: String,

    /// Quantity purchased.
    pub qty: u32,

    /// Size variant.
    pub size: String,

    /// Color variant.
    pub color: String,

    /// Unit price in minor currency units.
    pub price: u64,

    /// Product image URL.
    pub image: String,
}

impl From<&CartItem> for OrderItem {
    fn from(line: &CartItem) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            qty: line.qty,
            size: line.size.clone(),
            color: line.color.clone(),
            price: line.price,
            image: line.image.clone(),
        }
    }
}

/// A placed order.
///
/// Only ever constructed from a backend-confirmed response; the client never
/// fabricates a success state locally. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Backend order identifier.
    pub order_id: String,

    /// Gateway payment identifier; absent for cash on delivery.
    pub payment_id: Option<String>,

    /// Purchased lines.
    pub items: Vec<OrderItem>,

    /// Shipping destination as collected at checkout.
    pub shipping_address: ShippingForm,

    /// Amount charged, in minor currency units, including any surcharge.
    pub total_amount: u64,

    /// How the order is paid for.
    pub payment_method: PaymentMethod,

    /// When the order was placed.
    pub created_at: Timestamp,
}

impl Order {
    /// Whether payment is collected at delivery.
    #[must_use]
    pub fn is_cod(&self) -> bool {
        self.payment_method.is_cod()
    }
}
