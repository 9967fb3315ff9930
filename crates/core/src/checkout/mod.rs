//! Checkout
//!
//! The multi-step checkout flow: entry modes with their fixed step lists,
//! the shipping-details form and its validation, and the state machine that
//! walks a customer from order review to a confirmed order.

pub mod entry;
pub mod flow;
pub mod form;

pub use entry::{EntryMode, Step};
pub use flow::{CheckoutError, CheckoutFlow, FlowStatus};
pub use form::{Field, FieldErrors, ShippingForm};
