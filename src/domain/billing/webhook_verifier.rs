//! Stripe webhook signature verification.
//!
//! Stripe signs `"{t}.{raw body}"` with HMAC-SHA256 keyed by the endpoint's
//! signing secret and sends `t=<unix>,v1=<hex>[,v1=<hex>...]` in the
//! `Stripe-Signature` header. Several `v1` entries appear while a secret is
//! being rolled; any one of them matching is enough.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age for a signed webhook (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Maximum allowed clock skew for future timestamps (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

const HEADER_FORMAT_ERROR: &str = "Unable to extract timestamp and signatures from header";

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<signature>[,v1=...][,v0=...]`.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError(HEADER_FORMAT_ERROR.to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp in signature header".to_string())
                    })?);
                }
                "v1" => {
                    // Undecodable entries can never match; skip them like unknown schemes.
                    if let Ok(sig) = hex::decode(value) {
                        v1_signatures.push(sig);
                    }
                }
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError(HEADER_FORMAT_ERROR.to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError(
                "No signatures found with expected scheme".to_string(),
            ));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for Stripe webhook signatures.
#[derive(Clone)]
pub struct StripeWebhookVerifier {
    secret: SecretString,
    tolerance_secs: i64,
}

impl StripeWebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verifies the signature over the raw body and parses the event.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Same as [`verify_and_parse`](Self::verify_and_parse) with an explicit clock.
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let expected = self.compute_signature(header.timestamp, payload);
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        let age = now - header.timestamp;
        if age > self.tolerance_secs {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        sign(self.secret.expose_secret().as_bytes(), timestamp, payload)
    }
}

/// HMAC-SHA256 over the exact signed bytes, never a lossy string copy.
fn sign(secret: &[u8], timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Produces a `Stripe-Signature` header value the way Stripe signs a delivery.
///
/// Used by tests and local tooling that replays captured events.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(sign(secret.as_bytes(), timestamp, payload))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";
    const NOW: i64 = 1_700_000_000;

    fn verifier() -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    fn body() -> Vec<u8> {
        br#"{"id":"evt_1","type":"invoice.payment_failed","created":1700000000,"data":{"object":{"id":"in_1","customer":"cus_1","status":"open"}},"livemode":false}"#.to_vec()
    }

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_single_v1() {
        let header = SignatureHeader::parse(&format!("t=1234567890,v1={}", "a".repeat(64))).unwrap();
        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signatures.len(), 1);
        assert_eq!(header.v1_signatures[0].len(), 32);
    }

    #[test]
    fn parse_header_collects_every_v1_and_skips_v0() {
        let raw = format!(
            "t=1,v1={},v0={},v1={}",
            "a".repeat(64),
            "b".repeat(64),
            "c".repeat(64)
        );
        let header = SignatureHeader::parse(&raw).unwrap();
        assert_eq!(header.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let raw = format!("v1={}", "a".repeat(64));
        assert!(matches!(
            SignatureHeader::parse(&raw),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_without_v1_fails() {
        assert!(matches!(
            SignatureHeader::parse("t=1234567890"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_garbage_fails() {
        assert!(SignatureHeader::parse("garbage").is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn valid_signature_parses_event() {
        let header = sign_payload(TEST_SECRET, NOW, &body());
        let event = verifier().verify_at(&body(), &header, NOW).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, "invoice.payment_failed");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = sign_payload("whsec_other", NOW, &body());
        assert_eq!(
            verifier().verify_at(&body(), &header, NOW).unwrap_err(),
            WebhookError::InvalidSignature
        );
    }

    #[test]
    fn any_matching_v1_is_accepted() {
        let good = sign_payload(TEST_SECRET, NOW, &body());
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "0".repeat(64), good_sig);
        assert!(verifier().verify_at(&body(), &header, NOW).is_ok());
    }

    #[test]
    fn signed_timestamp_is_part_of_the_signature() {
        let header = sign_payload(TEST_SECRET, NOW, &body());
        let forged = header.replacen(&format!("t={}", NOW), &format!("t={}", NOW + 1), 1);
        assert_eq!(
            verifier().verify_at(&body(), &forged, NOW).unwrap_err(),
            WebhookError::InvalidSignature
        );
    }

    #[test]
    fn stale_delivery_is_rejected() {
        let signed_at = NOW - DEFAULT_TOLERANCE_SECS - 1;
        let header = sign_payload(TEST_SECRET, signed_at, &body());
        assert_eq!(
            verifier().verify_at(&body(), &header, NOW).unwrap_err(),
            WebhookError::TimestampOutOfRange
        );
    }

    #[test]
    fn custom_tolerance_is_honored() {
        let signed_at = NOW - 400;
        let header = sign_payload(TEST_SECRET, signed_at, &body());
        let verifier = verifier().with_tolerance(600);
        assert!(verifier.verify_at(&body(), &header, NOW).is_ok());
    }

    #[test]
    fn future_delivery_is_rejected() {
        let header = sign_payload(TEST_SECRET, NOW + 120, &body());
        assert_eq!(
            verifier().verify_at(&body(), &header, NOW).unwrap_err(),
            WebhookError::InvalidTimestamp
        );
    }

    #[test]
    fn signed_but_malformed_body_is_a_parse_error() {
        let payload = b"not json".to_vec();
        let header = sign_payload(TEST_SECRET, NOW, &payload);
        assert!(matches!(
            verifier().verify_at(&payload, &header, NOW),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn non_utf8_bodies_are_signed_bytewise() {
        // Two distinct invalid bytes must not collapse to the same signature.
        let a = vec![b'{', 0xff, b'}'];
        let b = vec![b'{', 0xfe, b'}'];
        assert_ne!(
            sign_payload(TEST_SECRET, NOW, &a),
            sign_payload(TEST_SECRET, NOW, &b)
        );
    }

    proptest! {
        #[test]
        fn any_single_byte_mutation_fails(
            index in 0usize..150,
            replacement in any::<u8>(),
        ) {
            let original = body();
            let index = index % original.len();
            prop_assume!(original[index] != replacement);

            let header = sign_payload(TEST_SECRET, NOW, &original);
            let mut mutated = original.clone();
            mutated[index] = replacement;

            prop_assert_eq!(
                verifier().verify_at(&mutated, &header, NOW).unwrap_err(),
                WebhookError::InvalidSignature
            );
        }

        #[test]
        fn every_signed_body_verifies(
            id in "[a-zA-Z0-9_]{1,24}",
            created in 1_600_000_000i64..1_800_000_000,
        ) {
            let payload = format!(
                r#"{{"id":"evt_{}","type":"ping","created":{},"data":{{"object":{{}}}}}}"#,
                id, created
            );
            let header = sign_payload(TEST_SECRET, created, payload.as_bytes());
            let event = verifier().verify_at(payload.as_bytes(), &header, created).unwrap();
            prop_assert_eq!(event.created, created);
        }
    }
}
