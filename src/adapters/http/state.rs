//! Shared application state for the HTTP adapters.

use std::sync::Arc;

use crate::application::handlers::account::{LoginHandler, RegisterHandler};
use crate::application::handlers::billing::{
    CancelSubscriptionHandler, CreateSetupIntentHandler, CreateSubscriptionHandler,
    GetBillingHistoryHandler, GetSubscriptionHandler, SavePaymentMethodHandler,
};
use crate::application::handlers::paypal::{
    CancelPayPalSubscriptionHandler, CaptureOrderHandler, CreateOrderHandler,
    CreatePayPalSubscriptionHandler, GetPayPalSubscriptionHandler,
};
use crate::application::handlers::webhooks::{
    HandlePayPalWebhookHandler, HandleStripeWebhookHandler,
};
use crate::domain::billing::{BillingError, Processor, StripeWebhookVerifier};
use crate::ports::{
    AccountRepository, PasswordHasher, PayPalGateway, StripeGateway, WebhookEventRepository,
};

/// Dependencies shared by every route.
///
/// Cloned per request; everything inside is `Arc`-wrapped. Processor clients
/// are optional so a deployment can run with only one processor configured.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub stripe: Option<Arc<dyn StripeGateway>>,
    pub stripe_webhook_verifier: Option<StripeWebhookVerifier>,
    pub paypal: Option<Arc<dyn PayPalGateway>>,
    pub paypal_webhook_id: Option<String>,
    /// Base for PayPal return and cancel URLs.
    pub frontend_url: String,
}

impl AppState {
    fn stripe(&self) -> Result<Arc<dyn StripeGateway>, BillingError> {
        self.stripe
            .clone()
            .ok_or(BillingError::NotConfigured(Processor::Stripe))
    }

    fn paypal(&self) -> Result<Arc<dyn PayPalGateway>, BillingError> {
        self.paypal
            .clone()
            .ok_or(BillingError::NotConfigured(Processor::PayPal))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accounts
    // ════════════════════════════════════════════════════════════════════════

    pub fn register_handler(&self) -> RegisterHandler {
        RegisterHandler::new(self.accounts.clone(), self.password_hasher.clone())
    }

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(self.accounts.clone(), self.password_hasher.clone())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Stripe commands
    // ════════════════════════════════════════════════════════════════════════

    pub fn create_setup_intent_handler(&self) -> Result<CreateSetupIntentHandler, BillingError> {
        Ok(CreateSetupIntentHandler::new(self.accounts.clone(), self.stripe()?))
    }

    pub fn save_payment_method_handler(&self) -> Result<SavePaymentMethodHandler, BillingError> {
        Ok(SavePaymentMethodHandler::new(self.accounts.clone(), self.stripe()?))
    }

    pub fn create_subscription_handler(&self) -> Result<CreateSubscriptionHandler, BillingError> {
        Ok(CreateSubscriptionHandler::new(self.accounts.clone(), self.stripe()?))
    }

    pub fn cancel_subscription_handler(&self) -> Result<CancelSubscriptionHandler, BillingError> {
        Ok(CancelSubscriptionHandler::new(self.accounts.clone(), self.stripe()?))
    }

    pub fn billing_history_handler(&self) -> Result<GetBillingHistoryHandler, BillingError> {
        Ok(GetBillingHistoryHandler::new(self.accounts.clone(), self.stripe()?))
    }

    pub fn subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.accounts.clone())
    }

    // ════════════════════════════════════════════════════════════════════════
    // PayPal commands
    // ════════════════════════════════════════════════════════════════════════

    pub fn create_order_handler(&self) -> Result<CreateOrderHandler, BillingError> {
        Ok(CreateOrderHandler::new(
            self.accounts.clone(),
            self.paypal()?,
            self.frontend_url.clone(),
        ))
    }

    pub fn capture_order_handler(&self) -> Result<CaptureOrderHandler, BillingError> {
        Ok(CaptureOrderHandler::new(self.accounts.clone(), self.paypal()?))
    }

    pub fn paypal_create_subscription_handler(
        &self,
    ) -> Result<CreatePayPalSubscriptionHandler, BillingError> {
        Ok(CreatePayPalSubscriptionHandler::new(
            self.accounts.clone(),
            self.paypal()?,
            self.frontend_url.clone(),
        ))
    }

    pub fn paypal_subscription_handler(&self) -> Result<GetPayPalSubscriptionHandler, BillingError> {
        Ok(GetPayPalSubscriptionHandler::new(self.paypal()?))
    }

    pub fn paypal_cancel_subscription_handler(
        &self,
    ) -> Result<CancelPayPalSubscriptionHandler, BillingError> {
        Ok(CancelPayPalSubscriptionHandler::new(
            self.accounts.clone(),
            self.paypal()?,
        ))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Webhooks
    // ════════════════════════════════════════════════════════════════════════

    pub fn stripe_webhook_handler(&self) -> HandleStripeWebhookHandler {
        HandleStripeWebhookHandler::new(
            self.stripe_webhook_verifier.clone(),
            self.accounts.clone(),
            self.webhook_events.clone(),
        )
    }

    pub fn paypal_webhook_handler(&self) -> HandlePayPalWebhookHandler {
        HandlePayPalWebhookHandler::new(
            self.paypal.clone(),
            self.paypal_webhook_id.clone(),
            self.accounts.clone(),
            self.webhook_events.clone(),
        )
    }
}
