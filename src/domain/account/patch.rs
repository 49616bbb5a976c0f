//! Field-level updates to an account's billing columns.

use crate::domain::foundation::Timestamp;

/// A set of billing column updates produced by one command or webhook event.
///
/// `None` leaves the stored value untouched, so a patch never erases data it
/// does not carry. The exceptions are `stripe_latest_invoice_status`, which is
/// assigned together with `stripe_latest_invoice_id`, and the explicit clear
/// flags.
///
/// `subscription_status` and `past_due` are contested by both processors.
/// Event patches write them only when `observed_at` is not older than the
/// account's `billing_status_at`, and advance that stamp. Command patches
/// carry no event time: they write the status directly and leave the stamp
/// alone, so the processor's own events for the same change still apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingPatch {
    /// Creation time of the processor event; `None` for command writes.
    pub observed_at: Option<Timestamp>,

    pub stripe_customer_id: Option<String>,
    pub stripe_default_payment_method_id: Option<String>,
    pub card_last4: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_latest_invoice_id: Option<String>,
    /// Assigned as-is (even `None`) whenever `stripe_latest_invoice_id` is set.
    pub stripe_latest_invoice_status: Option<String>,

    pub paypal_payer_id: Option<String>,
    pub paypal_subscription_id: Option<String>,
    /// Takes precedence over `paypal_subscription_id`.
    pub clear_paypal_subscription_id: bool,

    pub subscription_status: Option<String>,
    /// Takes precedence over `subscription_status`.
    pub clear_subscription_status: bool,
    pub past_due: Option<bool>,
}

/// What happened to a patch on a matched row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchEffect {
    Applied,
    /// Plain fields were written but the status fields were older than the
    /// stored ones and were dropped.
    StatusStale,
}

/// Result of applying a patch through a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchOutcome {
    pub matched: u64,
    pub stale: u64,
}

impl PatchOutcome {
    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn is_no_match(&self) -> bool {
        self.matched == 0
    }

    pub fn record(&mut self, effect: PatchEffect) {
        self.matched += 1;
        if effect == PatchEffect::StatusStale {
            self.stale += 1;
        }
    }
}

impl BillingPatch {
    /// An empty patch for an event created at `observed_at`.
    pub fn at(observed_at: Timestamp) -> Self {
        Self {
            observed_at: Some(observed_at),
            ..Self::command()
        }
    }

    /// An empty patch for a command write.
    pub fn command() -> Self {
        Self {
            observed_at: None,
            stripe_customer_id: None,
            stripe_default_payment_method_id: None,
            card_last4: None,
            stripe_subscription_id: None,
            stripe_price_id: None,
            stripe_latest_invoice_id: None,
            stripe_latest_invoice_status: None,
            paypal_payer_id: None,
            paypal_subscription_id: None,
            clear_paypal_subscription_id: false,
            subscription_status: None,
            clear_subscription_status: false,
            past_due: None,
        }
    }

    pub fn with_default_payment_method(
        mut self,
        payment_method_id: impl Into<String>,
        card_last4: Option<String>,
    ) -> Self {
        self.stripe_default_payment_method_id = Some(payment_method_id.into());
        self.card_last4 = card_last4;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.subscription_status = Some(status.into());
        self
    }

    /// Assigns the status outright; `None` clears the stored one.
    pub fn with_status_value(mut self, status: Option<String>) -> Self {
        self.clear_subscription_status = status.is_none();
        self.subscription_status = status;
        self
    }

    pub fn with_past_due(mut self, past_due: bool) -> Self {
        self.past_due = Some(past_due);
        self
    }

    /// True when the patch writes one of the time-guarded fields.
    pub fn touches_status(&self) -> bool {
        self.subscription_status.is_some()
            || self.clear_subscription_status
            || self.past_due.is_some()
    }

    /// Whether the guarded fields may overwrite a status stamped `stored`.
    /// Command patches always may.
    pub fn is_fresh_against(&self, stored: Option<Timestamp>) -> bool {
        match (self.observed_at, stored) {
            (Some(observed), Some(stored)) => !observed.is_before(&stored),
            _ => true,
        }
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        !self.touches_status()
            && !self.clear_paypal_subscription_id
            && [
                &self.stripe_customer_id,
                &self.stripe_default_payment_method_id,
                &self.card_last4,
                &self.stripe_subscription_id,
                &self.stripe_price_id,
                &self.stripe_latest_invoice_id,
                &self.stripe_latest_invoice_status,
                &self.paypal_payer_id,
                &self.paypal_subscription_id,
            ]
            .iter()
            .all(|f| f.is_none())
    }
}
