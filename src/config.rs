//! Configuration file handling for nullsms.
//!
//! Settings live in `~/.nullsms/config.toml`. Every section is optional and a
//! missing file means defaults. Secrets can also come from the environment,
//! which wins over the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::gateway::{ConfigError, GatewayConfig, TwilioConfig};
use crate::gateway::provider::DEFAULT_TWILIO_API_BASE;

/// Environment variable holding the quota override password.
pub const ENV_OVERRIDE_PASSWORD: &str = "NULLSMS_OVERRIDE_PASSWORD";
/// Environment variable holding the Twilio account SID.
pub const ENV_TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
/// Environment variable holding the Twilio auth token.
pub const ENV_TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
/// Environment variable holding the Twilio sending number.
pub const ENV_TWILIO_PHONE: &str = "TWILIO_PHONE";

/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// HTTP server settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the gateway listens on.
    pub bind: String,
    /// Take the client address from the first `X-Forwarded-For` hop.
    /// Only enable behind a reverse proxy that sets the header.
    pub trust_forwarded_for: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            trust_forwarded_for: false,
        }
    }
}

/// The whole configuration file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilio: Option<TwilioConfig>,
    pub server: ServerConfig,
}

impl Config {
    /// Loads the configuration from the default location plus environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from `path` plus environment.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.gateway.validate()?;
        Ok(config)
    }

    /// Applies secret overrides from `lookup` (normally the environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(password) = var(ENV_OVERRIDE_PASSWORD) {
            self.gateway.override_password = Some(password);
        }

        let sid = var(ENV_TWILIO_ACCOUNT_SID);
        let token = var(ENV_TWILIO_AUTH_TOKEN);
        let phone = var(ENV_TWILIO_PHONE);
        if sid.is_none() && token.is_none() && phone.is_none() {
            return;
        }

        let twilio = self.twilio.get_or_insert_with(|| TwilioConfig {
            account_sid: String::new(),
            auth_token: String::new(),
            from: String::new(),
            api_base: DEFAULT_TWILIO_API_BASE.to_string(),
        });
        if let Some(sid) = sid {
            twilio.account_sid = sid;
        }
        if let Some(token) = token {
            twilio.auth_token = token;
        }
        if let Some(phone) = phone {
            twilio.from = phone;
        }
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join("config.toml"))
    }
}

/// Get the nullsms configuration directory (`~/.nullsms`).
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".nullsms"))
        .ok_or(ConfigError::NoConfigDir)
}
