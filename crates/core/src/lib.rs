//! Storefront
//!
//! Storefront is the checkout domain core for a headless e-commerce client:
//! cart semantics, the multi-step checkout state machine, shipping-details
//! validation, derived order totals, and order-confirmation summaries.
//!
//! Everything here is synchronous and free of I/O. Talking to the backend
//! API, the payment gateway, and persisted client state is the job of the
//! `storefront-app` crate.

pub mod cart;
pub mod checkout;
pub mod confirmation;
pub mod order;
pub mod totals;
