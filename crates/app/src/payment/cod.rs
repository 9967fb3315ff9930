//! Cash-on-delivery order placement.

use std::sync::Arc;

use tracing::info;

use storefront::{
    cart::CartItem,
    checkout::ShippingForm,
    order::{Order, PaymentMethod},
    totals::OrderTotals,
};

use crate::{
    api::{BackendApi, types::CodOrderRequest},
    payment::{PaymentError, authorized_bearer, confirmed_order, unauthorized_clears_session},
    session::SessionHandle,
};

/// The cash-on-delivery submission path: a single order-creation call, no
/// gateway involvement.
pub struct CodPayment {
    api: Arc<dyn BackendApi>,
    session: SessionHandle,
}

impl CodPayment {
    /// Create the adapter.
    #[must_use]
    pub fn new(api: Arc<dyn BackendApi>, session: SessionHandle) -> Self {
        Self { api, session }
    }

    /// Place a cash-on-delivery order for the given lines.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`]; `Unauthorized` means the session was
    /// cleared and the customer must sign in again.
    pub async fn place_order(
        &self,
        items: &[CartItem],
        shipping: &ShippingForm,
        totals: OrderTotals,
    ) -> Result<Order, PaymentError> {
        let bearer = authorized_bearer(&self.session)?;

        let request = CodOrderRequest {
            items: items.iter().map(Into::into).collect(),
            shipping_address: shipping.clone(),
            total_amount: totals.final_total,
            payment_method: PaymentMethod::Cod,
        };

        let placed = self
            .api
            .create_cod_order(&bearer, &request)
            .await
            .map_err(|e| unauthorized_clears_session(&self.session, e))?;

        info!(order = %placed.order_id, "cod order placed");

        Ok(confirmed_order(
            placed,
            None,
            request.items,
            request.shipping_address,
            request.total_amount,
            PaymentMethod::Cod,
        ))
    }
}
