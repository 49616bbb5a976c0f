//! PayPal REST adapter.
//!
//! Authenticates with the OAuth2 client-credentials grant and caches the
//! access token until shortly before it expires. All calls are JSON.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::ports::{
    CapturedOrder, CreateOrderRequest, CreatePayPalSubscriptionRequest, GatewayError,
    GatewayErrorCode, PayPalGateway, PayPalOrder, PayPalSubscription, VerifyWebhookSignature,
};

use super::wire_types::{
    CancelBody, CaptureWire, Money, OrderBody, OrderContext, OrderWire, PayPalErrorBody,
    PaymentMethodPreference, PurchaseUnit, SubscriberBody, SubscriptionBody, SubscriptionContext,
    SubscriptionWire, TokenResponse, VerificationWire, BRAND_NAME,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Refresh this long before PayPal's stated expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

const DEFAULT_ORDER_DESCRIPTION: &str = "PriceGuard payment";

#[derive(Clone)]
pub struct PayPalApiConfig {
    client_id: String,
    client_secret: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl PayPalApiConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

struct CachedToken {
    value: SecretString,
    refresh_at: Instant,
}

/// PayPal gateway over reqwest.
pub struct PayPalGatewayAdapter {
    config: PayPalApiConfig,
    http_client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl PayPalGatewayAdapter {
    pub fn new(config: PayPalApiConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url, path)
    }

    /// Returns a valid access token, fetching a new one when the cached one
    /// is missing or about to expire.
    ///
    /// The lock is held across the fetch so concurrent callers wait for one
    /// token request instead of each issuing their own.
    async fn access_token(&self) -> Result<SecretString, GatewayError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http_client
            .post(self.url("v1/oauth2/token"))
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "PayPal token request failed");
            return Err(GatewayError::authentication(format!(
                "PayPal authentication failed: {}",
                error_message(status.as_u16(), &body)
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            GatewayError::invalid_response(format!("Failed to parse PayPal token: {}", e))
        })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        let value = SecretString::new(token.access_token);
        *cached = Some(CachedToken {
            value: value.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        tracing::debug!(expires_in = token.expires_in, "PayPal access token refreshed");
        Ok(value)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, GatewayError> {
        let token = self.access_token().await?;
        let mut request = self
            .http_client
            .request(method, self.url(path))
            .bearer_auth(token.expose_secret())
            .header("Prefer", "return=representation");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status.as_u16(), &body);
            tracing::error!(
                operation,
                status = status.as_u16(),
                error = %message,
                "PayPal API call failed"
            );
            return Err(GatewayError::new(
                GatewayErrorCode::from_status(status.as_u16()),
                message,
            ));
        }
        Ok(response)
    }

    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, GatewayError> {
        self.send_json(operation, method, path, body)
            .await?
            .json::<T>()
            .await
            .map_err(|e| {
                GatewayError::invalid_response(format!("Failed to parse PayPal response: {}", e))
            })
    }
}

/// PayPal's `message`, falling back to `name`, the OAuth description, or the
/// raw body.
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<PayPalErrorBody>(body) {
        Ok(err) => {
            let text = err
                .message
                .or(err.error_description)
                .or(err.name)
                .unwrap_or_else(|| format!("PayPal API error ({})", status));
            match err.debug_id {
                Some(debug_id) => format!("{} (debug_id {})", text, debug_id),
                None => text,
            }
        }
        Err(_) => format!("PayPal API error ({}): {}", status, body),
    }
}

#[async_trait]
impl PayPalGateway for PayPalGatewayAdapter {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<PayPalOrder, GatewayError> {
        let body = OrderBody {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnit {
                amount: Money {
                    currency_code: request.currency,
                    value: request.amount,
                },
                description: request
                    .description
                    .unwrap_or_else(|| DEFAULT_ORDER_DESCRIPTION.to_string()),
            }],
            application_context: OrderContext {
                brand_name: BRAND_NAME,
                landing_page: "BILLING",
                user_action: "PAY_NOW",
                return_url: request.return_url,
                cancel_url: request.cancel_url,
            },
        };
        let wire: OrderWire = self
            .call("create_order", reqwest::Method::POST, "v2/checkout/orders", Some(&body))
            .await?;
        Ok(wire.into())
    }

    async fn capture_order(&self, order_id: &str) -> Result<CapturedOrder, GatewayError> {
        let wire: CaptureWire = self
            .call(
                "capture_order",
                reqwest::Method::POST,
                &format!("v2/checkout/orders/{}/capture", order_id),
                Some(&serde_json::json!({})),
            )
            .await?;
        Ok(wire.into())
    }

    async fn create_subscription(
        &self,
        request: CreatePayPalSubscriptionRequest,
    ) -> Result<PayPalOrder, GatewayError> {
        let body = SubscriptionBody {
            plan_id: request.plan_id,
            subscriber: SubscriberBody {
                email_address: request.subscriber_email,
            },
            application_context: SubscriptionContext {
                brand_name: BRAND_NAME,
                locale: "en-US",
                shipping_preference: "NO_SHIPPING",
                user_action: "SUBSCRIBE_NOW",
                payment_method: PaymentMethodPreference {
                    payer_selected: "PAYPAL",
                    payee_preferred: "IMMEDIATE_PAYMENT_REQUIRED",
                },
                return_url: request.return_url,
                cancel_url: request.cancel_url,
            },
        };
        let wire: OrderWire = self
            .call(
                "create_subscription",
                reqwest::Method::POST,
                "v1/billing/subscriptions",
                Some(&body),
            )
            .await?;
        Ok(wire.into())
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<PayPalSubscription, GatewayError> {
        let wire: SubscriptionWire = self
            .call::<(), _>(
                "get_subscription",
                reqwest::Method::GET,
                &format!("v1/billing/subscriptions/{}", subscription_id),
                None,
            )
            .await?;
        Ok(wire.into())
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        reason: &str,
    ) -> Result<(), GatewayError> {
        // 204 No Content on success.
        self.send_json(
            "cancel_subscription",
            reqwest::Method::POST,
            &format!("v1/billing/subscriptions/{}/cancel", subscription_id),
            Some(&CancelBody { reason }),
        )
        .await?;
        Ok(())
    }

    async fn verify_webhook_signature(
        &self,
        request: VerifyWebhookSignature,
    ) -> Result<String, GatewayError> {
        let wire: VerificationWire = self
            .call(
                "verify_webhook_signature",
                reqwest::Method::POST,
                "v1/notifications/verify-webhook-signature",
                Some(&request),
            )
            .await?;
        Ok(wire.verification_status)
    }
}
