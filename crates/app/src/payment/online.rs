//! Online payment through the hosted gateway widget.

use std::sync::Arc;

use tracing::{error, info};

use storefront::{
    cart::CartItem,
    checkout::ShippingForm,
    order::{Order, OrderItem, PaymentMethod},
    totals::OrderTotals,
};

use crate::{
    api::{BackendApi, types::VerifyPaymentRequest},
    payment::{
        PaymentError, PaymentWidget, WidgetDisplay, WidgetOrder, authorized_bearer,
        confirmed_order, unauthorized_clears_session,
    },
    session::SessionHandle,
};

/// The online submission path: create a gateway order, collect payment
/// through the widget, then verify server-side.
pub struct OnlinePayment {
    api: Arc<dyn BackendApi>,
    widget: Arc<dyn PaymentWidget>,
    session: SessionHandle,
    display: WidgetDisplay,
}

impl OnlinePayment {
    /// Create the adapter.
    #[must_use]
    pub fn new(
        api: Arc<dyn BackendApi>,
        widget: Arc<dyn PaymentWidget>,
        session: SessionHandle,
        display: WidgetDisplay,
    ) -> Self {
        Self {
            api,
            widget,
            session,
            display,
        }
    }

    /// Place a prepaid order for the given lines.
    ///
    /// The order only exists once the verify endpoint confirms it; widget
    /// dismissal, gateway failure, or verification rejection leave nothing
    /// placed and the flow interactive.
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

        let gateway_order = self
            .api
            .create_payment_order(&bearer, totals.final_total)
            .await
            .map_err(|e| unauthorized_clears_session(&self.session, e))?;

        info!(
            order = %gateway_order.order_id,
            amount = gateway_order.amount,
            "gateway order created"
        );

        let confirmation = self
            .widget
            .collect(&WidgetOrder {
                order_id: gateway_order.order_id,
                amount: gateway_order.amount,
                currency: gateway_order.currency,
                name: self.display.name.clone(),
                description: self.display.description.clone(),
            })
            .await?;

        let payment_id = confirmation.payment_id.clone();
        let order_items: Vec<OrderItem> = items.iter().map(Into::into).collect();

        let request = VerifyPaymentRequest {
            payment_id: confirmation.payment_id,
            order_id: confirmation.order_id,
            signature: confirmation.signature,
            items: order_items,
            shipping_address: shipping.clone(),
            total_amount: totals.final_total,
        };

        let placed = match self.api.verify_payment(&bearer, &request).await {
            Ok(placed) => placed,
            Err(api_error) => {
                error!(%api_error, "payment verification rejected");

                return Err(unauthorized_clears_session(&self.session, api_error));
            }
        };

        info!(order = %placed.order_id, "online order placed");

        Ok(confirmed_order(
            placed,
            Some(payment_id),
            request.items,
            request.shipping_address,
            request.total_amount,
            PaymentMethod::Online,
        ))
    }
}
