//! Stripe REST adapter.
//!
//! Implements [`StripeGateway`] with form-encoded requests against
//! `api.stripe.com`, authenticated with the secret key as the basic-auth user.
//!
//! # Security
//!
//! - The secret key is held as `secrecy::SecretString` and only exposed when
//!   building the request
//! - Request and response bodies are never logged; only Stripe's error
//!   message and code are

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::domain::billing::{ChargeRecord, InvoiceRecord, PaymentIntentRecord};
use crate::domain::foundation::Timestamp;
use crate::ports::{
    CreateSubscriptionRequest, GatewayError, GatewayErrorCode, PaymentIntent, PaymentMethod,
    SetupIntent, StripeCustomer, StripeGateway, StripeSubscription,
};

use super::wire_types::{
    ChargeWire, CustomerWire, InvoiceWire, PaymentIntentWire, PaymentMethodWire,
    SetupIntentWire, StripeErrorEnvelope, StripeList, SubscriptionWire,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeApiConfig {
    api_key: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl StripeApiConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom API base URL (for stripe-mock or a proxy).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe gateway over reqwest.
pub struct StripeGatewayAdapter {
    config: StripeApiConfig,
    http_client: reqwest::Client,
}

impl StripeGatewayAdapter {
    pub fn new(config: StripeApiConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base_url, path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .http_client
            .post(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        read_response(operation, response).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .http_client
            .get(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        read_response(operation, response).await
    }

    fn list_query(customer_id: &str, since: Timestamp, limit: u32) -> Vec<(&'static str, String)> {
        vec![
            ("customer", customer_id.to_string()),
            ("created[gte]", since.unix().to_string()),
            ("limit", limit.to_string()),
        ]
    }
}

/// Decodes a success body, or turns Stripe's error envelope into a
/// [`GatewayError`] carrying Stripe's own message.
async fn read_response<T: DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = error_from_body(status.as_u16(), &body);
        tracing::error!(
            operation,
            status = status.as_u16(),
            code = ?err.provider_code,
            error = %err.message,
            "Stripe API call failed"
        );
        return Err(err);
    }

    response.json::<T>().await.map_err(|e| {
        GatewayError::invalid_response(format!("Failed to parse Stripe response: {}", e))
    })
}

fn error_from_body(status: u16, body: &str) -> GatewayError {
    let code = GatewayErrorCode::from_status(status);
    match serde_json::from_str::<StripeErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope
                .error
                .message
                .or(envelope.error.error_type)
                .unwrap_or_else(|| format!("Stripe API error ({})", status));
            let err = GatewayError::new(code, message);
            match envelope.error.code {
                Some(provider_code) => err.with_provider_code(provider_code),
                None => err,
            }
        }
        Err(_) => GatewayError::new(code, format!("Stripe API error ({}): {}", status, body)),
    }
}

#[async_trait]
impl StripeGateway for StripeGatewayAdapter {
    async fn create_customer(&self, email: &str) -> Result<StripeCustomer, GatewayError> {
        let wire: CustomerWire = self
            .post_form("create_customer", "customers", &[("email", email.to_string())])
            .await?;
        Ok(wire.into())
    }

    async fn create_setup_intent(&self, customer_id: &str) -> Result<SetupIntent, GatewayError> {
        let params = [
            ("customer", customer_id.to_string()),
            ("usage", "off_session".to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];
        let wire: SetupIntentWire = self
            .post_form("create_setup_intent", "setup_intents", &params)
            .await?;
        Ok(wire.into())
    }

    async fn retrieve_payment_method(
        &self,
        payment_method_id: &str,
    ) -> Result<PaymentMethod, GatewayError> {
        let wire: PaymentMethodWire = self
            .get(
                "retrieve_payment_method",
                &format!("payment_methods/{}", payment_method_id),
                &[],
            )
            .await?;
        Ok(wire.into())
    }

    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<PaymentMethod, GatewayError> {
        let wire: PaymentMethodWire = self
            .post_form(
                "attach_payment_method",
                &format!("payment_methods/{}/attach", payment_method_id),
                &[("customer", customer_id.to_string())],
            )
            .await?;
        Ok(wire.into())
    }

    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<(), GatewayError> {
        let _: CustomerWire = self
            .post_form(
                "set_default_payment_method",
                &format!("customers/{}", customer_id),
                &[(
                    "invoice_settings[default_payment_method]",
                    payment_method_id.to_string(),
                )],
            )
            .await?;
        Ok(())
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<StripeSubscription, GatewayError> {
        let params = [
            ("customer", request.customer_id),
            ("items[0][price]", request.price_id),
            ("default_payment_method", request.default_payment_method),
            ("payment_behavior", "default_incomplete".to_string()),
            (
                "payment_settings[save_default_payment_method]",
                "on_subscription".to_string(),
            ),
            ("expand[]", "latest_invoice.payment_intent".to_string()),
        ];
        let wire: SubscriptionWire = self
            .post_form("create_subscription", "subscriptions", &params)
            .await?;
        Ok(wire.into())
    }

    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        let wire: PaymentIntentWire = self
            .post_form(
                "confirm_payment_intent",
                &format!("payment_intents/{}/confirm", payment_intent_id),
                &[],
            )
            .await?;
        Ok(wire.into())
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<StripeSubscription, GatewayError> {
        let path = format!("subscriptions/{}", subscription_id);
        let wire: SubscriptionWire = if at_period_end {
            self.post_form(
                "cancel_subscription",
                &path,
                &[("cancel_at_period_end", "true".to_string())],
            )
            .await?
        } else {
            let response = self
                .http_client
                .delete(self.url(&path))
                .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
                .send()
                .await
                .map_err(|e| GatewayError::network(e.to_string()))?;
            read_response("cancel_subscription", response).await?
        };
        Ok(wire.into())
    }

    async fn list_invoices(
        &self,
        customer_id: &str,
        since: Timestamp,
        limit: u32,
    ) -> Result<Vec<InvoiceRecord>, GatewayError> {
        let list: StripeList<InvoiceWire> = self
            .get(
                "list_invoices",
                "invoices",
                &Self::list_query(customer_id, since, limit),
            )
            .await?;
        Ok(list.data.into_iter().map(InvoiceRecord::from).collect())
    }

    async fn list_payment_intents(
        &self,
        customer_id: &str,
        since: Timestamp,
        limit: u32,
    ) -> Result<Vec<PaymentIntentRecord>, GatewayError> {
        let list: StripeList<PaymentIntentWire> = self
            .get(
                "list_payment_intents",
                "payment_intents",
                &Self::list_query(customer_id, since, limit),
            )
            .await?;
        Ok(list.data.into_iter().map(PaymentIntentRecord::from).collect())
    }

    async fn list_charges(
        &self,
        customer_id: &str,
        since: Timestamp,
        limit: u32,
    ) -> Result<Vec<ChargeRecord>, GatewayError> {
        let list: StripeList<ChargeWire> = self
            .get(
                "list_charges",
                "charges",
                &Self::list_query(customer_id, since, limit),
            )
            .await?;
        Ok(list.data.into_iter().map(ChargeRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripe_error_message_is_surfaced() {
        let body = r#"{"error":{"message":"No such customer: 'cus_x'","code":"resource_missing","type":"invalid_request_error"}}"#;
        let err = error_from_body(404, body);

        assert_eq!(err.code, GatewayErrorCode::NotFound);
        assert_eq!(err.message, "No such customer: 'cus_x'");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn card_error_maps_to_card_declined() {
        let body = r#"{"error":{"message":"Your card was declined.","code":"card_declined","type":"card_error"}}"#;
        let err = error_from_body(402, body);
        assert_eq!(err.code, GatewayErrorCode::CardDeclined);
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        let err = error_from_body(502, "Bad Gateway");
        assert_eq!(err.code, GatewayErrorCode::ProviderError);
        assert!(err.message.contains("Bad Gateway"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = StripeApiConfig::new(SecretString::new("sk_test_1".to_string()))
            .with_base_url("http://localhost:12111/");
        let adapter = StripeGatewayAdapter::new(config).unwrap();
        assert_eq!(adapter.url("customers"), "http://localhost:12111/v1/customers");
    }

    #[test]
    fn list_query_filters_by_customer_and_creation_time() {
        let since = Timestamp::from_unix(1_700_000_000).unwrap();
        let query = StripeGatewayAdapter::list_query("cus_1", since, 100);
        assert_eq!(
            query,
            vec![
                ("customer", "cus_1".to_string()),
                ("created[gte]", "1700000000".to_string()),
                ("limit", "100".to_string()),
            ]
        );
    }
}
