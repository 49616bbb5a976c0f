//! GetPayPalSubscriptionHandler - looks a subscription up at PayPal.

use std::sync::Arc;

use crate::domain::billing::BillingError;
use crate::ports::{PayPalGateway, PayPalSubscription};

#[derive(Debug, Clone)]
pub struct GetPayPalSubscriptionQuery {
    pub subscription_id: String,
}

pub struct GetPayPalSubscriptionHandler {
    paypal: Arc<dyn PayPalGateway>,
}

impl GetPayPalSubscriptionHandler {
    pub fn new(paypal: Arc<dyn PayPalGateway>) -> Self {
        Self { paypal }
    }

    pub async fn handle(
        &self,
        query: GetPayPalSubscriptionQuery,
    ) -> Result<PayPalSubscription, BillingError> {
        Ok(self.paypal.get_subscription(&query.subscription_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::paypal::MockPayPalGateway;

    #[tokio::test]
    async fn returns_processor_view() {
        let paypal = MockPayPalGateway::new();
        paypal.add_subscription(PayPalSubscription {
            id: "I-1".to_string(),
            status: "ACTIVE".to_string(),
            plan_id: Some("P-1".to_string()),
            start_time: Some("2024-03-01T00:00:00Z".to_string()),
            next_billing_time: Some("2024-04-01T00:00:00Z".to_string()),
        });

        let sub = GetPayPalSubscriptionHandler::new(Arc::new(paypal))
            .handle(GetPayPalSubscriptionQuery { subscription_id: "I-1".into() })
            .await
            .unwrap();

        assert_eq!(sub.status, "ACTIVE");
    }

    #[tokio::test]
    async fn unknown_subscription_is_processor_error() {
        let err = GetPayPalSubscriptionHandler::new(Arc::new(MockPayPalGateway::new()))
            .handle(GetPayPalSubscriptionQuery { subscription_id: "I-404".into() })
            .await
            .unwrap_err();

        assert!(err.is_server_error());
    }
}
