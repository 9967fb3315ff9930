//! Backend API
//!
//! The storefront is a pure client: every business operation is a call to
//! the backend REST API, authenticated with a bearer access token. A 401
//! from any endpoint is the universal signal that the session is no longer
//! valid.

mod client;
mod errors;
pub mod types;

pub use client::*;
pub use errors::ApiError;
