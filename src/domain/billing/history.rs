//! Billing history: merges a customer's invoices, payment intents and charges
//! into one de-duplicated, newest-first transaction list.
//!
//! An invoice already represents the payment intent and charge that settled
//! it, so those standalone rows are suppressed when an invoice points at them.

use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// Invoice as listed by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRecord {
    pub id: String,
    pub number: Option<String>,
    pub amount_paid: i64,
    pub currency: String,
    pub status: Option<String>,
    pub created: i64,
    pub period_start: Option<i64>,
    pub period_end: Option<i64>,
    pub description: Option<String>,
    /// Description of the first invoice line, used as a fallback.
    pub line_description: Option<String>,
    pub hosted_invoice_url: Option<String>,
    pub invoice_pdf: Option<String>,
    pub payment_intent: Option<String>,
    pub charge: Option<String>,
}

/// Payment intent as listed by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRecord {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created: i64,
    pub description: Option<String>,
}

/// Charge as listed by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRecord {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created: i64,
    pub description: Option<String>,
    pub metadata_description: Option<String>,
    pub payment_intent: Option<String>,
    pub receipt_number: Option<String>,
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Invoice,
    PaymentIntent,
    Charge,
}

/// One normalized row of billing history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub transaction_number: Option<String>,
    /// Major currency units.
    pub amount: f64,
    pub currency: String,
    pub status: Option<String>,
    pub date: Timestamp,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
    pub hosted_invoice_url: Option<String>,
    pub invoice_pdf: Option<String>,
    pub description: String,
    pub is_processed: bool,
    pub is_processing: bool,
    #[serde(skip)]
    minor_amount: i64,
}

/// Aggregated history for one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingHistory {
    pub transactions: Vec<Transaction>,
    pub invoices: Vec<Transaction>,
    pub payment_intents: Vec<Transaction>,
    pub charges: Vec<Transaction>,
    /// Sum of processed rows, in major units.
    pub total_amount: f64,
    pub count: usize,
    pub processed_count: usize,
    pub processing_count: usize,
}

/// How far back history reaches.
pub const HISTORY_WINDOW_DAYS: i64 = 365;

/// Page size requested from the processor for each list.
pub const HISTORY_PAGE_LIMIT: u32 = 100;

fn to_major(minor: i64) -> f64 {
    minor as f64 / 100.0
}

fn at(secs: i64) -> Timestamp {
    Timestamp::from_unix(secs).unwrap_or_else(Timestamp::now)
}

/// Last twelve characters of a processor id, upper-cased.
fn short_reference(id: &str) -> String {
    let start = id.char_indices().rev().nth(11).map(|(i, _)| i).unwrap_or(0);
    id[start..].to_uppercase()
}

fn from_invoice(invoice: &InvoiceRecord) -> Transaction {
    let status = invoice.status.as_deref();
    Transaction {
        id: invoice.id.clone(),
        kind: TransactionType::Invoice,
        transaction_number: invoice.number.clone(),
        amount: to_major(invoice.amount_paid),
        currency: invoice.currency.to_uppercase(),
        status: invoice.status.clone(),
        date: at(invoice.created),
        period_start: invoice.period_start.and_then(Timestamp::from_unix),
        period_end: invoice.period_end.and_then(Timestamp::from_unix),
        hosted_invoice_url: invoice.hosted_invoice_url.clone(),
        invoice_pdf: invoice.invoice_pdf.clone(),
        description: invoice
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| invoice.line_description.clone().filter(|d| !d.is_empty()))
            .unwrap_or_else(|| "Subscription payment".to_string()),
        is_processed: status == Some("paid"),
        is_processing: matches!(status, Some("open") | Some("draft")),
        minor_amount: invoice.amount_paid,
    }
}

fn from_payment_intent(pi: &PaymentIntentRecord) -> Transaction {
    Transaction {
        id: pi.id.clone(),
        kind: TransactionType::PaymentIntent,
        transaction_number: Some(short_reference(&pi.id)),
        amount: to_major(pi.amount),
        currency: pi.currency.to_uppercase(),
        status: Some(pi.status.clone()),
        date: at(pi.created),
        period_start: None,
        period_end: None,
        hosted_invoice_url: None,
        invoice_pdf: None,
        description: pi
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Payment processing".to_string()),
        is_processed: pi.status == "succeeded",
        is_processing: matches!(
            pi.status.as_str(),
            "processing" | "requires_action" | "requires_payment_method"
        ),
        minor_amount: pi.amount,
    }
}

fn from_charge(charge: &ChargeRecord) -> Transaction {
    Transaction {
        id: charge.id.clone(),
        kind: TransactionType::Charge,
        transaction_number: Some(
            charge
                .receipt_number
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| short_reference(&charge.id)),
        ),
        amount: to_major(charge.amount),
        currency: charge.currency.to_uppercase(),
        status: Some(charge.status.clone()),
        date: at(charge.created),
        period_start: None,
        period_end: None,
        hosted_invoice_url: charge.receipt_url.clone(),
        invoice_pdf: charge.receipt_url.clone(),
        description: charge
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| charge.metadata_description.clone().filter(|d| !d.is_empty()))
            .unwrap_or_else(|| "Payment".to_string()),
        is_processed: charge.status == "succeeded",
        is_processing: charge.status == "pending",
        minor_amount: charge.amount,
    }
}

impl BillingHistory {
    /// Builds the merged history from the three processor listings.
    pub fn assemble(
        invoices: &[InvoiceRecord],
        payment_intents: &[PaymentIntentRecord],
        charges: &[ChargeRecord],
    ) -> Self {
        let invoice_rows: Vec<Transaction> = invoices.iter().map(from_invoice).collect();

        let intent_rows: Vec<Transaction> = payment_intents
            .iter()
            .filter(|pi| {
                let invoiced = invoices
                    .iter()
                    .any(|inv| inv.payment_intent.as_deref() == Some(pi.id.as_str()));
                pi.status != "succeeded" || !invoiced
            })
            .map(from_payment_intent)
            .collect();

        let charge_rows: Vec<Transaction> = charges
            .iter()
            .filter(|charge| {
                let invoiced = invoices
                    .iter()
                    .any(|inv| inv.charge.as_deref() == Some(charge.id.as_str()));
                let via_intent = charge
                    .payment_intent
                    .as_deref()
                    .map(|pi_id| payment_intents.iter().any(|pi| pi.id == pi_id))
                    .unwrap_or(false);
                !invoiced && !via_intent
            })
            .map(from_charge)
            .collect();

        let mut transactions: Vec<Transaction> = invoice_rows
            .iter()
            .chain(intent_rows.iter())
            .chain(charge_rows.iter())
            .cloned()
            .collect();
        // Stable sort keeps invoice/intent/charge order among equal dates.
        transactions.sort_by(|a, b| b.date.cmp(&a.date));

        let processed_minor: i64 = transactions
            .iter()
            .filter(|t| t.is_processed)
            .map(|t| t.minor_amount)
            .sum();
        let processed_count = transactions.iter().filter(|t| t.is_processed).count();
        let processing_count = transactions.iter().filter(|t| t.is_processing).count();

        Self {
            count: transactions.len(),
            transactions,
            invoices: invoice_rows,
            payment_intents: intent_rows,
            charges: charge_rows,
            total_amount: to_major(processed_minor),
            processed_count,
            processing_count,
        }
    }
}
