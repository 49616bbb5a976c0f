//! Stripe configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Stripe credentials.
///
/// Both values are optional at load time. A missing API key disables the
/// billing command routes; a missing webhook secret makes the Stripe webhook
/// answer "Webhook not configured" so misconfiguration is loud in the logs.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSettings {
    /// Secret API key (sk_live_... or sk_test_...)
    pub api_key: Option<SecretString>,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: Option<SecretString>,

    /// API base URL override, used against local fakes
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Maximum accepted age of a signed webhook, in seconds
    #[serde(default = "default_tolerance_secs")]
    pub tolerance_secs: i64,
}

impl StripeSettings {
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|k| !k.expose_secret().trim().is_empty())
    }

    pub fn webhook_secret(&self) -> Option<&SecretString> {
        self.webhook_secret
            .as_ref()
            .filter(|k| !k.expose_secret().trim().is_empty())
    }

    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.api_key()
            .map(|k| k.expose_secret().starts_with("sk_test_"))
            .unwrap_or(false)
    }

    /// Validate Stripe configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = self.api_key() {
            if !key.expose_secret().starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }
        if let Some(secret) = self.webhook_secret() {
            if !secret.expose_secret().starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }
        if !(1..=3600).contains(&self.tolerance_secs) {
            return Err(ValidationError::InvalidStripeTolerance);
        }
        Ok(())
    }
}

impl Default for StripeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            webhook_secret: None,
            api_base_url: default_api_base_url(),
            tolerance_secs: default_tolerance_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_tolerance_secs() -> i64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(key: Option<&str>, secret: Option<&str>) -> StripeSettings {
        StripeSettings {
            api_key: key.map(|k| SecretString::new(k.to_string())),
            webhook_secret: secret.map(|s| SecretString::new(s.to_string())),
            api_base_url: default_api_base_url(),
            tolerance_secs: default_tolerance_secs(),
        }
    }

    #[test]
    fn unconfigured_is_valid() {
        assert!(settings(None, None).validate().is_ok());
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = settings(Some("  "), Some(""));
        assert!(config.api_key().is_none());
        assert!(config.webhook_secret().is_none());
    }

    #[test]
    fn test_mode_detection() {
        assert!(settings(Some("sk_test_abc"), None).is_test_mode());
        assert!(!settings(Some("sk_live_abc"), None).is_test_mode());
        assert!(!settings(None, None).is_test_mode());
    }

    #[test]
    fn publishable_key_is_rejected() {
        assert!(matches!(
            settings(Some("pk_test_abc"), None).validate(),
            Err(ValidationError::InvalidStripeKey)
        ));
    }

    #[test]
    fn webhook_secret_prefix_is_enforced() {
        assert!(matches!(
            settings(Some("sk_test_abc"), Some("secret_xyz")).validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        ));
        assert!(settings(Some("sk_test_abc"), Some("whsec_xyz")).validate().is_ok());
    }

    #[test]
    fn tolerance_bounds() {
        let mut config = settings(None, None);
        config.tolerance_secs = 0;
        assert!(config.validate().is_err());
        config.tolerance_secs = 7200;
        assert!(config.validate().is_err());
    }
}
