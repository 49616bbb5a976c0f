//! PostgreSQL implementation of AccountRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::domain::account::{
    Account, AccountSelector, BillingPatch, CardOnFile, NewAccount, PatchEffect, PatchOutcome,
};
use crate::domain::foundation::{AccountId, DomainError, Email, Timestamp};
use crate::ports::AccountRepository;

use super::errors::map_sqlx_error;

const ACCOUNT_COLUMNS: &str = r#"
    id, email::text AS email, password_hash, plan, past_due, card_last4,
    credit_card_token, billing_zip, expiry_month, expiry_year,
    stripe_customer_id, stripe_default_payment_method_id, stripe_subscription_id,
    subscription_status, stripe_price_id, stripe_latest_invoice_id,
    stripe_latest_invoice_status, paypal_payer_id, paypal_subscription_id,
    paypal_payment_method_token, paypal_billing_agreement_id,
    billing_status_at, created_at, updated_at
"#;

/// PostgreSQL implementation of the AccountRepository port.
///
/// Every patch is one `UPDATE`: plain columns use `COALESCE`, the contested
/// status columns are guarded by `billing_status_at` inside the same
/// statement, so concurrent webhooks cannot interleave a read and a write.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
    plan: String,
    past_due: bool,
    card_last4: Option<String>,
    credit_card_token: Option<String>,
    billing_zip: Option<String>,
    expiry_month: Option<i32>,
    expiry_year: Option<i32>,
    stripe_customer_id: Option<String>,
    stripe_default_payment_method_id: Option<String>,
    stripe_subscription_id: Option<String>,
    subscription_status: Option<String>,
    stripe_price_id: Option<String>,
    stripe_latest_invoice_id: Option<String>,
    stripe_latest_invoice_status: Option<String>,
    paypal_payer_id: Option<String>,
    paypal_subscription_id: Option<String>,
    paypal_payment_method_token: Option<String>,
    paypal_billing_agreement_id: Option<String>,
    billing_status_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::new(&row.email)
            .map_err(|e| DomainError::database(format!("Invalid stored email: {}", e)))?;

        Ok(Account {
            id: AccountId::from_uuid(row.id),
            email,
            password_hash: row.password_hash,
            plan: row.plan,
            past_due: row.past_due,
            card_last4: row.card_last4,
            card_on_file: CardOnFile {
                token: row.credit_card_token,
                billing_zip: row.billing_zip,
                expiry_month: row.expiry_month,
                expiry_year: row.expiry_year,
            },
            stripe_customer_id: row.stripe_customer_id,
            stripe_default_payment_method_id: row.stripe_default_payment_method_id,
            stripe_subscription_id: row.stripe_subscription_id,
            subscription_status: row.subscription_status,
            stripe_price_id: row.stripe_price_id,
            stripe_latest_invoice_id: row.stripe_latest_invoice_id,
            stripe_latest_invoice_status: row.stripe_latest_invoice_status,
            paypal_payer_id: row.paypal_payer_id,
            paypal_subscription_id: row.paypal_subscription_id,
            paypal_payment_method_token: row.paypal_payment_method_token,
            paypal_billing_agreement_id: row.paypal_billing_agreement_id,
            billing_status_at: row.billing_status_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// A bind value for a selector's WHERE clause.
enum SelectorValue {
    Uuid(Uuid),
    Text(String),
}

/// Renders the WHERE clause for a selector, numbering placeholders from
/// `first`.
fn selector_clause(selector: &AccountSelector, first: usize) -> (String, Vec<SelectorValue>) {
    match selector {
        AccountSelector::Id(id) => (
            format!("id = ${}", first),
            vec![SelectorValue::Uuid(*id.as_uuid())],
        ),
        AccountSelector::Email(email) => (
            format!("email = ${}::citext", first),
            vec![SelectorValue::Text(email.as_str().to_string())],
        ),
        AccountSelector::StripeCustomer(customer) => (
            format!("stripe_customer_id = ${}", first),
            vec![SelectorValue::Text(customer.clone())],
        ),
        AccountSelector::PayPalSubscriber {
            email,
            subscription_id,
        } => (
            format!(
                "email = ${}::citext AND paypal_subscription_id = ${}",
                first,
                first + 1
            ),
            vec![
                SelectorValue::Text(email.as_str().to_string()),
                SelectorValue::Text(subscription_id.clone()),
            ],
        ),
    }
}

fn bind_selector(
    mut query: sqlx::query::Query<'_, Postgres, PgArguments>,
    values: Vec<SelectorValue>,
) -> sqlx::query::Query<'_, Postgres, PgArguments> {
    for value in values {
        query = match value {
            SelectorValue::Uuid(v) => query.bind(v),
            SelectorValue::Text(v) => query.bind(v),
        };
    }
    query
}

fn bind_selector_as<'q, O>(
    mut query: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    values: Vec<SelectorValue>,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            SelectorValue::Uuid(v) => query.bind(v),
            SelectorValue::Text(v) => query.bind(v),
        };
    }
    query
}

/// Status guard. `$1` is the event time, NULL for command writes.
const FRESH: &str =
    "($1::timestamptz IS NULL OR billing_status_at IS NULL OR billing_status_at <= $1)";

/// The single-statement patch.
///
/// A row is fresh when the patch is a command write, the row has no status
/// stamp, or its stamp is not newer than `$1`. After the update a fresh row's
/// stamp equals `$1` (or is untouched for commands) and a stale row's stamp
/// is still newer, which is what `RETURNING` reports.
fn patch_sql(where_clause: &str) -> String {
    format!(
        r#"
        UPDATE accounts SET
            stripe_customer_id = COALESCE($2, stripe_customer_id),
            stripe_default_payment_method_id = COALESCE($3, stripe_default_payment_method_id),
            card_last4 = COALESCE($4, card_last4),
            stripe_subscription_id = COALESCE($5, stripe_subscription_id),
            stripe_price_id = COALESCE($6, stripe_price_id),
            stripe_latest_invoice_status = CASE
                WHEN $7::text IS NOT NULL THEN $8
                ELSE stripe_latest_invoice_status
            END,
            stripe_latest_invoice_id = COALESCE($7, stripe_latest_invoice_id),
            paypal_payer_id = COALESCE($9, paypal_payer_id),
            paypal_subscription_id = CASE
                WHEN $10 THEN NULL
                ELSE COALESCE($11, paypal_subscription_id)
            END,
            subscription_status = CASE
                WHEN NOT {fresh} THEN subscription_status
                WHEN $15 THEN NULL
                ELSE COALESCE($12, subscription_status)
            END,
            past_due = CASE
                WHEN {fresh} THEN COALESCE($13, past_due)
                ELSE past_due
            END,
            billing_status_at = CASE
                WHEN $14 AND $1 IS NOT NULL AND {fresh} THEN $1
                ELSE billing_status_at
            END,
            updated_at = NOW()
        WHERE {where_clause}
        RETURNING {fresh} AS fresh
        "#,
        fresh = FRESH,
        where_clause = where_clause,
    )
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn insert(&self, new: NewAccount) -> Result<Option<Account>, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO accounts (
                email, password_hash, plan, card_last4,
                credit_card_token, billing_zip, expiry_month, expiry_year
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO NOTHING
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(new.email.as_str())
            .bind(&new.password_hash)
            .bind(&new.plan)
            .bind(&new.card_last4)
            .bind(&new.card_on_file.token)
            .bind(&new.card_on_file.billing_zip)
            .bind(new.card_on_file.expiry_month)
            .bind(new.card_on_file.expiry_year)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to insert account", e))?;

        row.map(Account::try_from).transpose()
    }

    async fn find(&self, selector: &AccountSelector) -> Result<Option<Account>, DomainError> {
        let (clause, values) = selector_clause(selector, 1);
        let sql = format!(
            "SELECT {} FROM accounts WHERE {} ORDER BY created_at LIMIT 1",
            ACCOUNT_COLUMNS, clause
        );

        let row: Option<AccountRow> = bind_selector_as(sqlx::query_as(&sql), values)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find account", e))?;

        row.map(Account::try_from).transpose()
    }

    async fn apply_patch(
        &self,
        selector: &AccountSelector,
        patch: &BillingPatch,
    ) -> Result<PatchOutcome, DomainError> {
        let (clause, values) = selector_clause(selector, 16);
        let sql = patch_sql(&clause);

        let query = sqlx::query(&sql)
            .bind(patch.observed_at.map(|t| *t.as_datetime()))
            .bind(patch.stripe_customer_id.clone())
            .bind(patch.stripe_default_payment_method_id.clone())
            .bind(patch.card_last4.clone())
            .bind(patch.stripe_subscription_id.clone())
            .bind(patch.stripe_price_id.clone())
            .bind(patch.stripe_latest_invoice_id.clone())
            .bind(patch.stripe_latest_invoice_status.clone())
            .bind(patch.paypal_payer_id.clone())
            .bind(patch.clear_paypal_subscription_id)
            .bind(patch.paypal_subscription_id.clone())
            .bind(patch.subscription_status.clone())
            .bind(patch.past_due)
            .bind(patch.touches_status())
            .bind(patch.clear_subscription_status);

        let rows = bind_selector(query, values)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to update account", e))?;

        let mut outcome = PatchOutcome::no_match();
        for row in rows {
            let fresh: bool = sqlx::Row::try_get(&row, "fresh")
                .map_err(|e| map_sqlx_error("Failed to read update result", e))?;
            outcome.record(if fresh || !patch.touches_status() {
                PatchEffect::Applied
            } else {
                PatchEffect::StatusStale
            });
        }
        Ok(outcome)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Database ping failed", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_placeholders_start_where_asked() {
        let (clause, values) = selector_clause(&AccountSelector::StripeCustomer("cus_1".into()), 15);
        assert_eq!(clause, "stripe_customer_id = $15");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn paypal_subscriber_selector_uses_two_placeholders() {
        let selector = AccountSelector::PayPalSubscriber {
            email: Email::new("a@x.com").unwrap(),
            subscription_id: "I-1".into(),
        };
        let (clause, values) = selector_clause(&selector, 15);
        assert_eq!(
            clause,
            "email = $15::citext AND paypal_subscription_id = $16"
        );
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn patch_sql_embeds_where_clause_and_guard() {
        let sql = patch_sql("id = $16");
        assert!(sql.contains("WHERE id = $16"));
        assert!(sql.contains("card_last4 = COALESCE($4, card_last4)"));
        assert!(sql.contains(&format!("RETURNING {} AS fresh", FRESH)));
    }

    #[test]
    fn invoice_status_is_assigned_with_its_invoice() {
        let sql = patch_sql("id = $16");
        assert!(sql.contains("WHEN $7::text IS NOT NULL THEN $8"));
        assert!(!sql.contains("COALESCE($8"));
    }

    #[test]
    fn command_writes_never_move_the_status_stamp() {
        let sql = patch_sql("id = $16");
        assert!(sql.contains("WHEN $14 AND $1 IS NOT NULL AND"));
    }
}
