//! Checkout coordination between the domain flow and backend services.
//!
//! [`CheckoutService`] owns a [`CheckoutFlow`] plus the two payment
//! adapters, seeds and persists the shipping draft, and runs the
//! post-success path: cache the confirmed order, then clear the cart and
//! delete the draft — in that order, never before confirmation.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use storefront::{
    checkout::{CheckoutError, CheckoutFlow, EntryMode, FieldErrors, ShippingForm, Step},
    order::{Order, PaymentMethod},
    totals::OrderTotals,
};

use crate::{
    cart::{CartStore, CartStoreError},
    payment::{CodPayment, OnlinePayment, PaymentError},
    session::SessionHandle,
    store::{self, StateStore, StoreError, keys},
};

/// Errors surfaced by checkout coordination.
#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    /// A transition the flow refuses.
    #[error(transparent)]
    Flow(#[from] CheckoutError),

    /// The payment adapter failed; `Unauthorized` means the customer must
    /// sign in again.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Draft or order persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Clearing the cart after a confirmed order failed.
    #[error(transparent)]
    Cart(#[from] CartStoreError),
}

/// Everything checkout needs from the application.
pub struct CheckoutDeps {
    /// The online submission path.
    pub online: OnlinePayment,

    /// The cash-on-delivery submission path.
    pub cod: CodPayment,

    /// The current session.
    pub session: SessionHandle,

    /// Persisted client state for drafts and the last order.
    pub store: Arc<dyn StateStore>,

    /// Cash-on-delivery surcharge in minor currency units.
    pub cod_surcharge: u64,
}

/// Coordinates one checkout attempt from entry to a confirmed order.
pub struct CheckoutService {
    flow: CheckoutFlow,
    deps: CheckoutDeps,
}

impl CheckoutService {
    /// Enter checkout and seed the shipping draft from the signed-in
    /// profile and any persisted draft.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAuthenticated`] without a session and
    /// [`CheckoutError::EmptyCart`] for an empty cart outside buy-now
    /// mode; the caller redirects instead of rendering checkout.
    pub fn begin(
        mode: EntryMode,
        cart: &CartStore,
        deps: CheckoutDeps,
    ) -> Result<Self, CheckoutServiceError> {
        let current = deps.session.current();

        let mut flow = CheckoutFlow::enter(mode, cart.cart(), current.is_some())?;

        if let Some(session) = current {
            let draft: Option<ShippingForm> =
                store::get_typed(deps.store.as_ref(), keys::CHECKOUT_FORM)?;

            flow.set_form(ShippingForm::seeded(
                &session.user.name,
                &session.user.email,
                draft,
            ));
        }

        Ok(Self { flow, deps })
    }

    /// The current step.
    #[must_use]
    pub fn step(&self) -> Step {
        self.flow.step()
    }

    /// The underlying flow, for rendering.
    #[must_use]
    pub fn flow(&self) -> &CheckoutFlow {
        &self.flow
    }

    /// The shipping draft.
    #[must_use]
    pub fn form(&self) -> &ShippingForm {
        self.flow.form()
    }

    /// Validation errors from the last blocked advance.
    #[must_use]
    pub fn field_errors(&self) -> &FieldErrors {
        self.flow.field_errors()
    }

    /// Totals for the current lines and payment method.
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        self.flow.totals(self.deps.cod_surcharge)
    }

    /// Edit the shipping draft. The draft is persisted on every change
    /// while checkout is active.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutServiceError`] if the draft cannot be written.
    pub fn update_form(
        &mut self,
        edit: impl FnOnce(&mut ShippingForm),
    ) -> Result<(), CheckoutServiceError> {
        edit(self.flow.form_mut());

        store::put_typed(self.deps.store.as_ref(), keys::CHECKOUT_FORM, self.flow.form())?;

        Ok(())
    }

    /// Advance one step; validation gates leaving the shipping step.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::advance`].
    pub fn advance(&mut self) -> Result<(), CheckoutServiceError> {
        Ok(self.flow.advance()?)
    }

    /// Step back one step.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::back`].
    pub fn back(&mut self) -> Result<(), CheckoutServiceError> {
        Ok(self.flow.back()?)
    }

    /// Select a payment method.
    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.flow.select_payment_method(method);
    }

    /// Submit the order through the selected payment adapter.
    ///
    /// On success the confirmed order is cached under [`keys::LAST_ORDER`]
    /// before the cart snapshot and draft are destroyed, so a reloaded
    /// confirmation view can still read it. On failure the flow is
    /// interactive again and the cart and draft are untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutServiceError`] carrying the adapter failure.
    pub async fn submit(&mut self, cart: &mut CartStore) -> Result<Order, CheckoutServiceError> {
        self.flow.begin_submit()?;

        let totals = self.totals();

        let result = match self.flow.payment_method() {
            PaymentMethod::Online => {
                self.deps
                    .online
                    .place_order(self.flow.items(), self.flow.form(), totals)
                    .await
            }
            PaymentMethod::Cod => {
                self.deps
                    .cod
                    .place_order(self.flow.items(), self.flow.form(), totals)
                    .await
            }
        };

        match result {
            Ok(order) => {
                store::put_typed(self.deps.store.as_ref(), keys::LAST_ORDER, &order)?;

                self.flow.complete(order.clone())?;

                if !matches!(self.flow.entry_mode(), EntryMode::BuyNow(_)) {
                    cart.clear()?;
                }

                self.deps.store.remove(keys::CHECKOUT_FORM)?;

                info!(order = %order.order_id, "order placed");

                Ok(order)
            }
            Err(payment_error) => {
                self.flow.fail(payment_error.to_string())?;

                Err(payment_error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use testresult::TestResult;

    use storefront::checkout::FlowStatus;

    use crate::{
        api::{ApiError, MockBackendApi, types::PlacedOrder},
        payment::{MockPaymentWidget, WidgetDisplay},
        session::{SessionHandle, SessionState},
        store::MemoryStore,
        test::{cart_item, live_session, shipping_form},
    };

    use super::*;

    struct Fixture {
        store: Arc<MemoryStore>,
        session: SessionHandle,
        cart: CartStore,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let session =
                SessionHandle::load(store.clone()).expect("load should succeed");
            session
                .sign_in(live_session())
                .expect("sign_in should succeed");

            let mut cart = CartStore::load(store.clone()).expect("load should succeed");
            cart.add(cart_item()).expect("add should succeed");

            Self {
                store,
                session,
                cart,
            }
        }

        fn deps(&self, api: MockBackendApi) -> CheckoutDeps {
            let api: Arc<dyn crate::api::BackendApi> = Arc::new(api);

            CheckoutDeps {
                online: OnlinePayment::new(
                    api.clone(),
                    Arc::new(MockPaymentWidget::new()),
                    self.session.clone(),
                    WidgetDisplay {
                        name: "Storefront".to_owned(),
                        description: "Order payment".to_owned(),
                    },
                ),
                cod: CodPayment::new(api, self.session.clone()),
                session: self.session.clone(),
                store: self.store.clone(),
                cod_surcharge: 80,
            }
        }
    }

    fn cod_api(order_id: &str) -> MockBackendApi {
        let order_id = order_id.to_owned();
        let mut api = MockBackendApi::new();

        api.expect_create_cod_order().returning(move |_bearer, _request| {
            Ok(PlacedOrder {
                order_id: order_id.clone(),
                payment_id: None,
            })
        });

        api
    }

    #[test]
    fn begin_seeds_the_form_from_profile_and_draft() -> TestResult {
        let fixture = Fixture::new();

        let mut draft = ShippingForm::default();
        draft.city = "Pune".to_owned();
        draft.email = "draft@example.com".to_owned();

        store::put_typed(fixture.store.as_ref(), keys::CHECKOUT_FORM, &draft)?;

        let service = CheckoutService::begin(
            EntryMode::Standard,
            &fixture.cart,
            fixture.deps(MockBackendApi::new()),
        )?;

        // The draft wins where it has a value; the profile fills the rest.
        assert_eq!(service.form().email, "draft@example.com");
        assert_eq!(service.form().city, "Pune");
        assert_eq!(service.form().full_name, "Asha Rao");

        Ok(())
    }

    #[test]
    fn begin_without_a_session_is_rejected() -> TestResult {
        let fixture = Fixture::new();
        fixture.session.sign_out()?;

        let result = CheckoutService::begin(
            EntryMode::Standard,
            &fixture.cart,
            fixture.deps(MockBackendApi::new()),
        );

        assert!(
            matches!(
                result.as_ref().err(),
                Some(CheckoutServiceError::Flow(CheckoutError::NotAuthenticated))
            ),
            "expected NotAuthenticated"
        );

        Ok(())
    }

    #[test]
    fn update_form_persists_the_draft() -> TestResult {
        let fixture = Fixture::new();

        let mut service = CheckoutService::begin(
            EntryMode::Standard,
            &fixture.cart,
            fixture.deps(MockBackendApi::new()),
        )?;

        service.update_form(|form| form.city = "Pune".to_owned())?;

        let draft: Option<ShippingForm> =
            store::get_typed(fixture.store.as_ref(), keys::CHECKOUT_FORM)?;

        assert_eq!(draft.map(|d| d.city), Some("Pune".to_owned()));

        Ok(())
    }

    #[tokio::test]
    async fn cod_submit_runs_the_post_success_path() -> TestResult {
        let mut fixture = Fixture::new();

        let mut service = CheckoutService::begin(
            EntryMode::FromCartSidebar,
            &fixture.cart,
            fixture.deps(cod_api("ord-1")),
        )?;

        service.update_form(|form| *form = shipping_form())?;
        service.advance()?;
        service.select_payment_method(PaymentMethod::Cod);

        let order = service.submit(&mut fixture.cart).await?;

        assert_eq!(order.order_id, "ord-1");
        assert!(order.is_cod());

        // Post-success: order cached, cart cleared, draft deleted.
        let cached: Option<Order> = store::get_typed(fixture.store.as_ref(), keys::LAST_ORDER)?;
        assert_eq!(cached.map(|o| o.order_id), Some("ord-1".to_owned()));

        assert!(fixture.cart.cart().is_empty());

        let draft: Option<ShippingForm> =
            store::get_typed(fixture.store.as_ref(), keys::CHECKOUT_FORM)?;
        assert!(draft.is_none(), "draft should be deleted");

        Ok(())
    }

    #[tokio::test]
    async fn buy_now_submit_leaves_the_cart_alone() -> TestResult {
        let mut fixture = Fixture::new();

        let mut service = CheckoutService::begin(
            EntryMode::BuyNow(cart_item()),
            &fixture.cart,
            fixture.deps(cod_api("ord-2")),
        )?;

        service.update_form(|form| *form = shipping_form())?;
        service.advance()?;
        service.select_payment_method(PaymentMethod::Cod);

        service.submit(&mut fixture.cart).await?;

        assert_eq!(fixture.cart.cart().len(), 1, "cart was bypassed, not cleared");

        Ok(())
    }

    #[tokio::test]
    async fn failed_submit_keeps_cart_and_draft() -> TestResult {
        let mut fixture = Fixture::new();

        let mut api = MockBackendApi::new();
        api.expect_create_cod_order().returning(|_bearer, _request| {
            Err(ApiError::Backend {
                status: 500,
                message: "boom".to_owned(),
            })
        });

        let mut service =
            CheckoutService::begin(EntryMode::FromCartSidebar, &fixture.cart, fixture.deps(api))?;

        service.update_form(|form| *form = shipping_form())?;
        service.advance()?;
        service.select_payment_method(PaymentMethod::Cod);

        let result = service.submit(&mut fixture.cart).await;

        assert!(result.is_err(), "submit should fail");
        assert!(matches!(service.flow().status(), FlowStatus::Failed(_)));

        assert!(!fixture.cart.cart().is_empty(), "cart must survive failure");

        let draft: Option<ShippingForm> =
            store::get_typed(fixture.store.as_ref(), keys::CHECKOUT_FORM)?;
        assert!(draft.is_some(), "draft must survive failure");

        let cached: Option<Order> = store::get_typed(fixture.store.as_ref(), keys::LAST_ORDER)?;
        assert!(cached.is_none(), "no order may be cached on failure");

        Ok(())
    }

    #[tokio::test]
    async fn a_401_during_submit_signs_the_customer_out() -> TestResult {
        let mut fixture = Fixture::new();

        let mut api = MockBackendApi::new();
        api.expect_create_cod_order()
            .returning(|_bearer, _request| Err(ApiError::Unauthorized));

        let mut service =
            CheckoutService::begin(EntryMode::FromCartSidebar, &fixture.cart, fixture.deps(api))?;

        service.update_form(|form| *form = shipping_form())?;
        service.advance()?;
        service.select_payment_method(PaymentMethod::Cod);

        let result = service.submit(&mut fixture.cart).await;

        assert!(
            matches!(
                result.as_ref().err(),
                Some(CheckoutServiceError::Payment(PaymentError::Unauthorized))
            ),
            "expected Unauthorized"
        );
        assert_eq!(fixture.session.state(), SessionState::SignedOut);

        Ok(())
    }
}
