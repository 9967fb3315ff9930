//! Checkout state machine.

use thiserror::Error;

use crate::{
    cart::{Cart, CartItem},
    checkout::{
        entry::{EntryMode, Step},
        form::{FieldErrors, ShippingForm},
    },
    order::{Order, PaymentMethod},
    totals::OrderTotals,
};

/// Errors related to checkout transitions.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was entered with an empty cart outside buy-now mode; the
    /// caller should redirect out instead of rendering the flow.
    #[error("cart is empty")]
    EmptyCart,

    /// Checkout was entered without a signed-in session; the caller should
    /// redirect to login.
    #[error("not signed in")]
    NotAuthenticated,

    /// Shipping validation failed; field errors were recorded and the flow
    /// stays on the shipping step.
    #[error("shipping details are incomplete")]
    InvalidShippingDetails,

    /// `back` was requested on the first step.
    #[error("already at the first step")]
    AtFirstStep,

    /// `advance` was requested on the final collecting step; submission
    /// goes through [`CheckoutFlow::begin_submit`] instead.
    #[error("already at the final step")]
    AtFinalStep,

    /// Submission was requested away from the payment step, or while a
    /// submission is already in flight or completed.
    #[error("checkout is not ready to submit")]
    NotReadyToSubmit,

    /// A completion or failure was reported while no submission was in
    /// flight.
    #[error("no submission in flight")]
    NotSubmitting,
}

/// Where the flow is relative to submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    /// Collecting order review, shipping details, and the payment choice.
    Collecting,

    /// A payment adapter call is in flight.
    Submitting,

    /// The backend confirmed the order.
    Completed(Box<Order>),

    /// The last submission failed; the flow is interactive again and the
    /// customer may retry.
    Failed(String),
}

/// The checkout state machine.
///
/// Owns a snapshot of the lines being ordered, the shipping draft, the
/// selected payment method, and the current step. Lines are snapshotted on
/// entry: buy-now mode carries its single synthesized line and never reads
/// the cart.
#[derive(Debug)]
pub struct CheckoutFlow {
    mode: EntryMode,
    items: Vec<CartItem>,
    step_index: usize,
    form: ShippingForm,
    field_errors: FieldErrors,
    transient_error: Option<String>,
    payment_method: PaymentMethod,
    status: FlowStatus,
}

impl CheckoutFlow {
    /// Enter checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAuthenticated`] without a session and
    /// [`CheckoutError::EmptyCart`] when the cart is empty outside buy-now
    /// mode. In both cases no flow is created.
    pub fn enter(mode: EntryMode, cart: &Cart, authenticated: bool) -> Result<Self, CheckoutError> {
        if !authenticated {
            return Err(CheckoutError::NotAuthenticated);
        }

        let items = match &mode {
            EntryMode::BuyNow(item) => vec![item.clone()],
            EntryMode::Standard | EntryMode::FromCartSidebar => {
                if cart.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }

                cart.items().to_vec()
            }
        };

        Ok(Self {
            mode,
            items,
            step_index: 0,
            form: ShippingForm::default(),
            field_errors: FieldErrors::default(),
            transient_error: None,
            payment_method: PaymentMethod::default(),
            status: FlowStatus::Collecting,
        })
    }

    /// How checkout was entered.
    #[must_use]
    pub fn entry_mode(&self) -> &EntryMode {
        &self.mode
    }

    /// The current step.
    #[must_use]
    pub fn step(&self) -> Step {
        self.mode
            .steps()
            .get(self.step_index)
            .copied()
            .unwrap_or(Step::PaymentMethod)
    }

    /// The lines being ordered.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The shipping draft.
    #[must_use]
    pub fn form(&self) -> &ShippingForm {
        &self.form
    }

    /// Replace the shipping draft, e.g. with a seeded or edited copy.
    pub fn set_form(&mut self, form: ShippingForm) {
        self.form = form;
    }

    /// Mutable access to the shipping draft for field edits.
    pub fn form_mut(&mut self) -> &mut ShippingForm {
        &mut self.form
    }

    /// Validation errors from the last blocked advance.
    #[must_use]
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// The transient notification from the last blocked advance, if any.
    #[must_use]
    pub fn transient_error(&self) -> Option<&str> {
        self.transient_error.as_deref()
    }

    /// The selected payment method.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Select a payment method. Clears a previous failure message.
    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
        self.make_interactive();
    }

    /// Submission status.
    #[must_use]
    pub fn status(&self) -> &FlowStatus {
        &self.status
    }

    /// Totals for the current lines and payment method.
    #[must_use]
    pub fn totals(&self, cod_surcharge: u64) -> OrderTotals {
        OrderTotals::compute(&self.items, self.payment_method, cod_surcharge)
    }

    /// Advance one step.
    ///
    /// Leaving the shipping step runs full-form validation; on failure the
    /// flow stays put, records field errors and a transient notification,
    /// and returns [`CheckoutError::InvalidShippingDetails`].
    ///
    /// # Errors
    ///
    /// Also returns [`CheckoutError::AtFinalStep`] on the payment step,
    /// where submission happens through [`CheckoutFlow::begin_submit`].
    pub fn advance(&mut self) -> Result<(), CheckoutError> {
        self.make_interactive();

        match self.step() {
            Step::ReviewOrder => {
                self.step_index += 1;

                Ok(())
            }
            Step::ShippingDetails => {
                let errors = self.form.validate();

                if !errors.is_empty() {
                    self.field_errors = errors;
                    self.transient_error =
                        Some("Please fill in all required fields correctly".to_owned());

                    return Err(CheckoutError::InvalidShippingDetails);
                }

                self.field_errors.clear();
                self.transient_error = None;
                self.step_index += 1;

                Ok(())
            }
            Step::PaymentMethod => Err(CheckoutError::AtFinalStep),
        }
    }

    /// Step back one step, clearing field errors and the transient
    /// notification. Form data is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AtFirstStep`] on the first step.
    pub fn back(&mut self) -> Result<(), CheckoutError> {
        if self.step_index == 0 {
            return Err(CheckoutError::AtFirstStep);
        }

        self.make_interactive();
        self.step_index -= 1;
        self.field_errors.clear();
        self.transient_error = None;

        Ok(())
    }

    /// Mark a payment adapter call as in flight.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotReadyToSubmit`] away from the payment
    /// step or while already submitting or completed.
    pub fn begin_submit(&mut self) -> Result<(), CheckoutError> {
        if self.step() != Step::PaymentMethod {
            return Err(CheckoutError::NotReadyToSubmit);
        }

        match self.status {
            FlowStatus::Collecting | FlowStatus::Failed(_) => {
                self.status = FlowStatus::Submitting;

                Ok(())
            }
            FlowStatus::Submitting | FlowStatus::Completed(_) => {
                Err(CheckoutError::NotReadyToSubmit)
            }
        }
    }

    /// Record the backend-confirmed order and finish the flow.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotSubmitting`] when no submission is in
    /// flight.
    pub fn complete(&mut self, order: Order) -> Result<(), CheckoutError> {
        if self.status != FlowStatus::Submitting {
            return Err(CheckoutError::NotSubmitting);
        }

        self.status = FlowStatus::Completed(Box::new(order));

        Ok(())
    }

    /// Record a failed submission. The flow becomes interactive again so
    /// the customer can retry; form data and payment choice are kept.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotSubmitting`] when no submission is in
    /// flight.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CheckoutError> {
        if self.status != FlowStatus::Submitting {
            return Err(CheckoutError::NotSubmitting);
        }

        self.status = FlowStatus::Failed(message.into());

        Ok(())
    }

    /// A failed submission stays interactive: the next interaction clears
    /// the failure back to collecting.
    fn make_interactive(&mut self) {
        if matches!(self.status, FlowStatus::Failed(_)) {
            self.status = FlowStatus::Collecting;
        }
    }
}
