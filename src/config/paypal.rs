//! PayPal configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// PayPal environment.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayPalMode {
    #[default]
    Sandbox,
    Live,
}

impl PayPalMode {
    /// REST API host for this mode.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            PayPalMode::Sandbox => "https://api-m.sandbox.paypal.com",
            PayPalMode::Live => "https://api-m.paypal.com",
        }
    }
}

/// PayPal REST credentials and webhook registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayPalSettings {
    pub client_id: Option<String>,

    pub client_secret: Option<SecretString>,

    /// Id of the webhook registered in the PayPal dashboard; required for
    /// signature verification.
    pub webhook_id: Option<String>,

    #[serde(default)]
    pub mode: PayPalMode,

    /// Overrides the host derived from `mode`
    pub api_base_url: Option<String>,
}

impl PayPalSettings {
    /// Credentials, when both halves are present and non-blank.
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        let id = self.client_id.as_deref().filter(|s| !s.trim().is_empty())?;
        let secret = self
            .client_secret
            .as_ref()
            .filter(|s| !s.expose_secret().trim().is_empty())?;
        Some((id, secret))
    }

    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn base_url(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| self.mode.api_base_url().to_string())
    }

    /// Validate PayPal configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_id = self
            .client_id
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        let has_secret = self
            .client_secret
            .as_ref()
            .map(|s| !s.expose_secret().trim().is_empty())
            .unwrap_or(false);
        if has_id != has_secret {
            return Err(ValidationError::IncompletePayPalCredentials);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> PayPalSettings {
        PayPalSettings {
            client_id: Some("client".to_string()),
            client_secret: Some(SecretString::new("secret".to_string())),
            webhook_id: Some("WH-1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn sandbox_is_the_default_mode() {
        let config = PayPalSettings::default();
        assert_eq!(config.mode, PayPalMode::Sandbox);
        assert_eq!(config.base_url(), "https://api-m.sandbox.paypal.com");
    }

    #[test]
    fn live_mode_uses_live_host() {
        let config = PayPalSettings {
            mode: PayPalMode::Live,
            ..configured()
        };
        assert_eq!(config.base_url(), "https://api-m.paypal.com");
    }

    #[test]
    fn explicit_base_url_wins() {
        let config = PayPalSettings {
            api_base_url: Some("http://127.0.0.1:9999".to_string()),
            ..configured()
        };
        assert_eq!(config.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn credentials_require_both_halves() {
        assert!(configured().credentials().is_some());

        let half = PayPalSettings {
            client_secret: None,
            ..configured()
        };
        assert!(half.credentials().is_none());
        assert!(matches!(
            half.validate(),
            Err(ValidationError::IncompletePayPalCredentials)
        ));
    }

    #[test]
    fn unconfigured_is_valid() {
        let config = PayPalSettings::default();
        assert!(config.validate().is_ok());
        assert!(config.credentials().is_none());
        assert!(config.webhook_id().is_none());
    }
}
