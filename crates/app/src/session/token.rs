//! Access-token expiry decoding.
//!
//! The access token is JWT-shaped. Only the embedded `exp` claim matters
//! here; signature verification is the backend's job and never happens on
//! the client.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jiff::Timestamp;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when decoding an access token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is not made of three dot-separated segments.
    #[error("access token format is invalid")]
    InvalidFormat,

    /// The payload segment is not valid base64url.
    #[error("access token payload encoding is invalid")]
    InvalidPayloadEncoding,

    /// The payload segment is not valid JSON.
    #[error("access token payload is invalid")]
    InvalidPayload,

    /// The payload carries no `exp` claim.
    #[error("access token has no expiry claim")]
    MissingExpiry,

    /// The `exp` claim is outside the representable time range.
    #[error("access token expiry is out of range")]
    ExpiryOutOfRange,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Decode the expiry claim of a JWT-shaped token without verifying it.
///
/// # Errors
///
/// Returns a [`TokenError`] for anything other than a well-formed token
/// with an in-range `exp` claim.
pub fn decode_expiry(token: &str) -> Result<Timestamp, TokenError> {
    let mut segments = token.split('.');

    let _header = segments.next().ok_or(TokenError::InvalidFormat)?;
    let payload = segments.next().ok_or(TokenError::InvalidFormat)?;
    let _signature = segments.next().ok_or(TokenError::InvalidFormat)?;

    if segments.next().is_some() {
        return Err(TokenError::InvalidFormat);
    }

    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_error| TokenError::InvalidPayloadEncoding)?;

    let claims: Claims =
        serde_json::from_slice(&decoded).map_err(|_error| TokenError::InvalidPayload)?;

    let exp = claims.exp.ok_or(TokenError::MissingExpiry)?;

    Timestamp::from_second(exp).map_err(|_error| TokenError::ExpiryOutOfRange)
}

/// Whether the token is expired at `now`. A token that cannot be decoded
/// counts as expired; it must never be attached to an authenticated call.
#[must_use]
pub fn is_expired(token: &str, now: Timestamp) -> bool {
    !decode_expiry(token).is_ok_and(|expiry| expiry > now)
}
