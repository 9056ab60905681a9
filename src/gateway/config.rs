//! Gateway policy configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::{DEFAULT_MAX_NORMAL_LEN, DEFAULT_QUOTA_LIMIT};

/// Default provider timeout in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// User-agent tokens that mark a request as automated.
///
/// Matched as case-insensitive substrings.
pub const DEFAULT_BOT_SIGNATURES: &[&str] = &[
    "bot",
    "spider",
    "crawl",
    "curl",
    "wget",
    "python",
    "scrapy",
    "httpclient",
    "libwww",
    "go-http-client",
    "java/",
    "postman",
    "headless",
];

/// Abuse and dispatch policy for the gateway.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Sends allowed per client before the override password is required.
    pub quota_limit: u32,

    /// Maximum body length (in characters) for normal-mode messages.
    pub max_normal_len: usize,

    /// Provider call timeout in seconds.
    pub provider_timeout_secs: u64,

    /// Shared secret that bypasses the quota. `None` disables overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_password: Option<String>,

    /// User-agent denylist tokens.
    pub bot_signatures: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            quota_limit: DEFAULT_QUOTA_LIMIT,
            max_normal_len: DEFAULT_MAX_NORMAL_LEN,
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            override_password: None,
            bot_signatures: DEFAULT_BOT_SIGNATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("quota_limit", &self.quota_limit)
            .field("max_normal_len", &self.max_normal_len)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field(
                "override_password",
                &self.override_password.as_ref().map(|_| "<redacted>"),
            )
            .field("bot_signatures", &self.bot_signatures)
            .finish()
    }
}

impl GatewayConfig {
    /// Sets the override password.
    pub fn with_override_password(mut self, password: impl Into<String>) -> Self {
        self.override_password = Some(password.into());
        self
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Checks that every limit is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quota_limit == 0 {
            return Err(ConfigError::Invalid("quota_limit must be at least 1".into()));
        }
        if self.max_normal_len == 0 {
            return Err(ConfigError::Invalid(
                "max_normal_len must be at least 1".into(),
            ));
        }
        if self.provider_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider_timeout_secs must be at least 1".into(),
            ));
        }
        if matches!(&self.override_password, Some(p) if p.is_empty()) {
            return Err(ConfigError::Invalid(
                "override_password must not be empty".into(),
            ));
        }
        Ok(())
    }
}
