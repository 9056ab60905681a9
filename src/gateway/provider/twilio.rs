//! Twilio Programmable Messaging provider.
//!
//! Sends `POST {api_base}/2010-04-01/Accounts/{sid}/Messages.json` with form
//! fields `To`, `From` and `Body`, authenticated with HTTP basic auth.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MessageProvider;
use crate::gateway::error::ProviderError;

/// Public Twilio REST endpoint.
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Twilio account settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwilioConfig {
    /// Account SID (`AC...`).
    pub account_sid: String,
    /// Account auth token.
    pub auth_token: String,
    /// Sending phone number.
    pub from: String,
    /// API base URL, overridable for testing.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_TWILIO_API_BASE.to_string()
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from", &self.from)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TwilioConfig {
    /// Fails if any credential is blank.
    pub fn ensure_complete(&self) -> Result<(), ProviderError> {
        for (name, value) in [
            ("account_sid", &self.account_sid),
            ("auth_token", &self.auth_token),
            ("from", &self.from),
        ] {
            if value.trim().is_empty() {
                return Err(ProviderError::NotConfigured(format!("twilio {name} is empty")));
            }
        }
        Ok(())
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

/// The subset of Twilio's message/error resource we read.
#[derive(Debug, Deserialize)]
struct TwilioResponse {
    sid: Option<String>,
    message: Option<String>,
}

/// Twilio-backed provider.
pub struct TwilioProvider {
    config: TwilioConfig,
    client: reqwest::Client,
}

impl TwilioProvider {
    pub fn new(config: TwilioConfig) -> Result<Self, ProviderError> {
        config.ensure_complete()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("nullsms/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl MessageProvider for TwilioProvider {
    async fn send(&self, destination: &str, body: &str) -> Result<String, ProviderError> {
        debug!(destination, "posting message to twilio");

        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", destination),
                ("From", self.config.from.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        interpret_response(status, &text)
    }

    fn name(&self) -> &str {
        "twilio"
    }
}

/// Turns a Twilio HTTP response into a message id or an error.
fn interpret_response(status: u16, body: &str) -> Result<String, ProviderError> {
    let parsed: Option<TwilioResponse> = serde_json::from_str(body).ok();

    if (200..300).contains(&status) {
        return parsed
            .and_then(|r| r.sid)
            .ok_or_else(|| ProviderError::InvalidResponse("missing message sid".into()));
    }

    let message = parsed
        .and_then(|r| r.message)
        .unwrap_or_else(|| format!("provider returned HTTP {status}"));
    Err(ProviderError::Rejected { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".into(),
            auth_token: "s3cr3t-token".into(),
            from: "+15550000".into(),
            api_base: "https://api.example.test/".into(),
        }
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            config().messages_url(),
            "https://api.example.test/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_success_returns_sid() {
        let body = r#"{"sid": "SM42", "status": "queued"}"#;
        assert_eq!(interpret_response(201, body).unwrap(), "SM42");
    }

    #[test]
    fn test_success_without_sid_is_invalid() {
        assert!(matches!(
            interpret_response(200, "{}"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_error_surfaces_provider_message() {
        let body = r#"{"code": 21211, "message": "The 'To' number is not valid.", "status": 400}"#;
        assert_eq!(
            interpret_response(400, body).unwrap_err(),
            ProviderError::Rejected {
                status: 400,
                message: "The 'To' number is not valid.".into()
            }
        );
    }

    #[test]
    fn test_error_without_json() {
        let err = interpret_response(503, "Service Unavailable").unwrap_err();
        assert_eq!(err.to_string(), "provider returned HTTP 503");
    }

    #[test]
    fn test_incomplete_config_rejected() {
        let mut cfg = config();
        cfg.auth_token = " ".into();
        assert!(matches!(
            TwilioProvider::new(cfg),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        assert!(!format!("{:?}", config()).contains("s3cr3t"));
    }
}
