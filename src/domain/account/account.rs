//! The account row: identity, credential and both processors' billing linkage.

use serde::Serialize;

use crate::domain::foundation::{AccountId, Email, Timestamp};

use super::patch::{BillingPatch, PatchEffect};

/// One row of the accounts store.
///
/// Every processor field is optional; `None` means the account was never
/// linked to that processor (or the link was explicitly cleared).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    pub password_hash: String,
    pub plan: String,
    pub past_due: bool,
    pub card_last4: Option<String>,
    pub card_on_file: CardOnFile,

    pub stripe_customer_id: Option<String>,
    pub stripe_default_payment_method_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_latest_invoice_id: Option<String>,
    pub stripe_latest_invoice_status: Option<String>,

    pub paypal_payer_id: Option<String>,
    pub paypal_subscription_id: Option<String>,
    pub paypal_payment_method_token: Option<String>,
    pub paypal_billing_agreement_id: Option<String>,

    /// Time of the newest event whose status fields were applied.
    pub billing_status_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Card details captured at sign-up, before any processor is linked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardOnFile {
    pub token: Option<String>,
    pub billing_zip: Option<String>,
    pub expiry_month: Option<i32>,
    pub expiry_year: Option<i32>,
}

/// Fields needed to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub password_hash: String,
    pub plan: String,
    pub card_last4: Option<String>,
    pub card_on_file: CardOnFile,
}

impl Account {
    /// Builds the row a fresh registration produces.
    pub fn register(new: NewAccount) -> Self {
        let now = Timestamp::now();
        Self {
            id: AccountId::new(),
            email: new.email,
            password_hash: new.password_hash,
            plan: new.plan,
            past_due: false,
            card_last4: new.card_last4,
            card_on_file: new.card_on_file,
            stripe_customer_id: None,
            stripe_default_payment_method_id: None,
            stripe_subscription_id: None,
            subscription_status: None,
            stripe_price_id: None,
            stripe_latest_invoice_id: None,
            stripe_latest_invoice_status: None,
            paypal_payer_id: None,
            paypal_subscription_id: None,
            paypal_payment_method_token: None,
            paypal_billing_agreement_id: None,
            billing_status_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a patch in memory with the same semantics the SQL adapter uses.
    ///
    /// Plain fields overwrite only when the patch carries a value. The
    /// contested status fields are applied only when the patch is not older
    /// than the last applied status; only event patches move that stamp.
    pub fn apply(&mut self, patch: &BillingPatch) -> PatchEffect {
        fn coalesce(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }

        coalesce(&mut self.stripe_customer_id, &patch.stripe_customer_id);
        coalesce(
            &mut self.stripe_default_payment_method_id,
            &patch.stripe_default_payment_method_id,
        );
        coalesce(&mut self.card_last4, &patch.card_last4);
        coalesce(&mut self.stripe_subscription_id, &patch.stripe_subscription_id);
        coalesce(&mut self.stripe_price_id, &patch.stripe_price_id);
        if patch.stripe_latest_invoice_id.is_some() {
            self.stripe_latest_invoice_id = patch.stripe_latest_invoice_id.clone();
            self.stripe_latest_invoice_status = patch.stripe_latest_invoice_status.clone();
        }
        coalesce(&mut self.paypal_payer_id, &patch.paypal_payer_id);
        if patch.clear_paypal_subscription_id {
            self.paypal_subscription_id = None;
        } else {
            coalesce(&mut self.paypal_subscription_id, &patch.paypal_subscription_id);
        }

        let mut effect = PatchEffect::Applied;
        if patch.touches_status() {
            if patch.is_fresh_against(self.billing_status_at) {
                if patch.clear_subscription_status {
                    self.subscription_status = None;
                } else {
                    coalesce(&mut self.subscription_status, &patch.subscription_status);
                }
                if let Some(past_due) = patch.past_due {
                    self.past_due = past_due;
                }
                if let Some(observed) = patch.observed_at {
                    self.billing_status_at = Some(observed);
                }
            } else {
                effect = PatchEffect::StatusStale;
            }
        }

        self.updated_at = Timestamp::now();
        effect
    }
}

/// Public projection of an account, without the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: AccountId,
    pub email: String,
    pub plan: String,
    pub past_due: bool,
    pub card_last4: Option<String>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.to_string(),
            plan: account.plan.clone(),
            past_due: account.past_due,
            card_last4: account.card_last4.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::register(NewAccount {
            email: Email::new("a@x.com").unwrap(),
            password_hash: "hash".to_string(),
            plan: "basic".to_string(),
            card_last4: None,
            card_on_file: Default::default(),
        })
    }

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix(secs).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════
    // COALESCE fields
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn absent_card_last4_keeps_stored_value() {
        let mut acct = account();
        acct.card_last4 = Some("4242".to_string());

        acct.apply(&BillingPatch::at(at(10)).with_default_payment_method("pm_2", None));

        assert_eq!(acct.card_last4.as_deref(), Some("4242"));
        assert_eq!(acct.stripe_default_payment_method_id.as_deref(), Some("pm_2"));
    }

    #[test]
    fn present_card_last4_overwrites() {
        let mut acct = account();
        acct.card_last4 = Some("4242".to_string());

        acct.apply(
            &BillingPatch::at(at(10)).with_default_payment_method("pm_2", Some("1881".into())),
        );

        assert_eq!(acct.card_last4.as_deref(), Some("1881"));
    }

    #[test]
    fn absent_price_keeps_stored_value() {
        let mut acct = account();
        acct.stripe_price_id = Some("price_gold".to_string());

        let mut patch = BillingPatch::at(at(10));
        patch.stripe_subscription_id = Some("sub_1".to_string());
        acct.apply(&patch);

        assert_eq!(acct.stripe_price_id.as_deref(), Some("price_gold"));
    }

    #[test]
    fn clearing_paypal_subscription_beats_set() {
        let mut acct = account();
        acct.paypal_subscription_id = Some("I-1".to_string());

        let mut patch = BillingPatch::at(at(10));
        patch.clear_paypal_subscription_id = true;
        acct.apply(&patch);

        assert!(acct.paypal_subscription_id.is_none());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Status freshness guard
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn status_from_older_event_is_dropped() {
        let mut acct = account();

        let newer = BillingPatch::at(at(200)).with_past_due(false);
        let older = BillingPatch::at(at(100)).with_past_due(true);

        assert_eq!(acct.apply(&newer), PatchEffect::Applied);
        assert_eq!(acct.apply(&older), PatchEffect::StatusStale);

        assert!(!acct.past_due);
        assert_eq!(acct.billing_status_at, Some(at(200)));
    }

    #[test]
    fn stale_patch_still_applies_plain_fields() {
        let mut acct = account();
        acct.apply(&BillingPatch::at(at(200)).with_status("active"));

        let mut older = BillingPatch::at(at(100)).with_status("past_due");
        older.stripe_latest_invoice_id = Some("in_1".to_string());
        acct.apply(&older);

        assert_eq!(acct.subscription_status.as_deref(), Some("active"));
        assert_eq!(acct.stripe_latest_invoice_id.as_deref(), Some("in_1"));
    }

    #[test]
    fn equal_timestamps_reapply() {
        let mut acct = account();
        let patch = BillingPatch::at(at(100)).with_status("past_due").with_past_due(true);

        acct.apply(&patch);
        let once = acct.clone();
        assert_eq!(acct.apply(&patch), PatchEffect::Applied);

        assert_eq!(acct.subscription_status, once.subscription_status);
        assert_eq!(acct.past_due, once.past_due);
        assert_eq!(acct.billing_status_at, once.billing_status_at);
    }

    #[test]
    fn patch_without_status_does_not_move_the_clock() {
        let mut acct = account();
        acct.apply(&BillingPatch::at(at(100)).with_past_due(true));
        acct.apply(&BillingPatch::at(at(500)).with_default_payment_method("pm_1", None));

        assert_eq!(acct.billing_status_at, Some(at(100)));
    }

    #[test]
    fn invoice_status_follows_its_invoice() {
        let mut acct = account();
        let mut paid = BillingPatch::at(at(100)).with_past_due(false);
        paid.stripe_latest_invoice_id = Some("in_1".to_string());
        paid.stripe_latest_invoice_status = Some("paid".to_string());
        acct.apply(&paid);

        let mut next = BillingPatch::at(at(200)).with_past_due(true);
        next.stripe_latest_invoice_id = Some("in_2".to_string());
        acct.apply(&next);

        assert_eq!(acct.stripe_latest_invoice_id.as_deref(), Some("in_2"));
        assert_eq!(acct.stripe_latest_invoice_status, None);
    }

    #[test]
    fn status_value_none_clears_stored_status() {
        let mut acct = account();
        acct.subscription_status = Some("ACTIVE".to_string());

        acct.apply(&BillingPatch::at(at(100)).with_status_value(None));

        assert_eq!(acct.subscription_status, None);
    }

    #[test]
    fn command_write_leaves_the_clock_alone() {
        let mut acct = account();
        acct.apply(&BillingPatch::at(at(100)).with_status("active"));

        let effect = acct.apply(&BillingPatch::command().with_status("canceled"));

        assert_eq!(effect, PatchEffect::Applied);
        assert_eq!(acct.subscription_status.as_deref(), Some("canceled"));
        assert_eq!(acct.billing_status_at, Some(at(100)));
    }

    #[test]
    fn event_after_command_write_in_same_second_applies() {
        let mut acct = account();
        acct.apply(&BillingPatch::command().with_status("incomplete"));

        let effect = acct.apply(&BillingPatch::at(at(1_700_000_000)).with_status("active"));

        assert_eq!(effect, PatchEffect::Applied);
        assert_eq!(acct.subscription_status.as_deref(), Some("active"));
    }

    #[test]
    fn summary_hides_credential() {
        let acct = account();
        let json = serde_json::to_value(AccountSummary::from(&acct)).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["pastDue"], false);
        assert!(json.get("passwordHash").is_none());
    }
}
