//! Backend REST client.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;

use crate::api::{
    errors::ApiError,
    types::{
        AuthPayload, CodOrderRequest, Credentials, GatewayOrder, PlacedOrder, SignupRequest,
        VerifyPaymentRequest,
    },
};

/// Configuration for the backend REST API.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL all endpoint paths are joined to, e.g.
    /// `"http://localhost:5000/api"`.
    pub base_url: String,
}

/// HTTP client for the storefront backend API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: BackendConfig,
    http: Client,
}

impl HttpBackend {
    /// Create a client from the given configuration.
    ///
    /// Refresh-token rotation rides on an HTTP-only cookie, so the
    /// underlying client keeps a cookie store.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, ApiError> {
        let http = Client::builder().cookie_store(true).build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(backend_error(status, &body));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Map a non-2xx response to [`ApiError::Backend`], preferring the
/// backend's own `message` field over the raw body.
fn backend_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<MessagePayload>(body)
        .map(|payload| payload.message)
        .unwrap_or_else(|_ignored| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.to_owned()
            }
        });

    ApiError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct WishlistPayload {
    items: Vec<String>,
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError> {
        self.execute(self.http.post(self.url("/login")).json(credentials))
            .await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthPayload, ApiError> {
        self.execute(self.http.post(self.url("/signup")).json(request))
            .await
    }

    async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let payload: MessagePayload = self
            .execute(
                self.http
                    .post(self.url("/forgot-password"))
                    .json(&json!({ "email": email })),
            )
            .await?;

        Ok(payload.message)
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<String, ApiError> {
        let payload: MessagePayload = self
            .execute(
                self.http
                    .post(self.url(&format!("/reset-password/{token}")))
                    .json(&json!({ "password": password })),
            )
            .await?;

        Ok(payload.message)
    }

    async fn refresh(&self) -> Result<String, ApiError> {
        let payload: RefreshPayload = self.execute(self.http.post(self.url("/refresh"))).await?;

        Ok(payload.access_token)
    }

    async fn wishlist(&self, token: &str) -> Result<Vec<String>, ApiError> {
        let payload: WishlistPayload = self
            .execute(self.http.get(self.url("/wishlist")).bearer_auth(token))
            .await?;

        Ok(payload.items)
    }

    async fn toggle_wishlist(&self, token: &str, product_id: &str) -> Result<Vec<String>, ApiError> {
        let payload: WishlistPayload = self
            .execute(
                self.http
                    .post(self.url("/wishlist/toggle"))
                    .bearer_auth(token)
                    .json(&json!({ "productId": product_id })),
            )
            .await?;

        Ok(payload.items)
    }

    async fn create_payment_order(&self, token: &str, amount: u64) -> Result<GatewayOrder, ApiError> {
        self.execute(
            self.http
                .post(self.url("/payment/create-order"))
                .bearer_auth(token)
                .json(&json!({ "amount": amount })),
        )
        .await
    }

    async fn verify_payment(
        &self,
        token: &str,
        request: &VerifyPaymentRequest,
    ) -> Result<PlacedOrder, ApiError> {
        self.execute(
            self.http
                .post(self.url("/payment/verify-payment"))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }

    async fn create_cod_order(
        &self,
        token: &str,
        request: &CodOrderRequest,
    ) -> Result<PlacedOrder, ApiError> {
        self.execute(
            self.http
                .post(self.url("/payment/create-cod-order"))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }
}

/// The backend REST API, one method per consumed endpoint.
///
/// Authenticated methods take the bearer access token explicitly; callers
/// are responsible for refusing to attach an expired one.
#[automock]
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Sign in with credentials.
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError>;

    /// Create an account.
    async fn signup(&self, request: &SignupRequest) -> Result<AuthPayload, ApiError>;

    /// Request a password-reset email. Returns the backend message.
    async fn forgot_password(&self, email: &str) -> Result<String, ApiError>;

    /// Complete a password reset with the emailed token.
    async fn reset_password(&self, token: &str, password: &str) -> Result<String, ApiError>;

    /// Mint a new access token from the refresh cookie.
    async fn refresh(&self) -> Result<String, ApiError>;

    /// Fetch the wishlisted product ids.
    async fn wishlist(&self, token: &str) -> Result<Vec<String>, ApiError>;

    /// Add or remove a product from the wishlist; returns the new list.
    async fn toggle_wishlist(&self, token: &str, product_id: &str) -> Result<Vec<String>, ApiError>;

    /// Create a gateway order for the given amount.
    async fn create_payment_order(&self, token: &str, amount: u64) -> Result<GatewayOrder, ApiError>;

    /// Verify a widget confirmation and place the order.
    async fn verify_payment(
        &self,
        token: &str,
        request: &VerifyPaymentRequest,
    ) -> Result<PlacedOrder, ApiError>;

    /// Place a cash-on-delivery order.
    async fn create_cod_order(
        &self,
        token: &str,
        request: &CodOrderRequest,
    ) -> Result<PlacedOrder, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_prefers_the_message_field() {
        let error = backend_error(StatusCode::BAD_REQUEST, r#"{"message":"Cart expired"}"#);

        assert!(
            matches!(
                &error,
                ApiError::Backend { status: 400, message } if message == "Cart expired"
            ),
            "unexpected mapping: {error:?}"
        );
    }

    #[test]
    fn backend_error_falls_back_to_the_raw_body() {
        let error = backend_error(StatusCode::BAD_GATEWAY, "upstream down");

        assert!(
            matches!(
                &error,
                ApiError::Backend { status: 502, message } if message == "upstream down"
            ),
            "unexpected mapping: {error:?}"
        );
    }

    #[test]
    fn backend_error_with_empty_body_uses_the_status_line() {
        let error = backend_error(StatusCode::INTERNAL_SERVER_ERROR, "");

        assert!(
            matches!(
                &error,
                ApiError::Backend { status: 500, message } if message.contains("500")
            ),
            "unexpected mapping: {error:?}"
        );
    }
}
