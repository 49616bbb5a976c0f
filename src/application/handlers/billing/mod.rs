//! Stripe billing handlers.
//!
//! ## Commands
//! - Creating a setup intent (and the customer on first use)
//! - Saving a confirmed payment method as the default
//! - Creating and cancelling subscriptions
//!
//! ## Queries
//! - Billing history over the trailing year
//! - Locally mirrored subscription state

mod cancel_subscription;
mod create_setup_intent;
mod create_subscription;
mod get_billing_history;
mod get_subscription;
mod save_payment_method;

// Commands
pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use create_setup_intent::{
    CreateSetupIntentCommand, CreateSetupIntentHandler, CreateSetupIntentResult,
};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use save_payment_method::{
    SavePaymentMethodCommand, SavePaymentMethodHandler, SavePaymentMethodResult,
};

// Queries
pub use get_billing_history::{GetBillingHistoryHandler, GetBillingHistoryQuery};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, SubscriptionView};
