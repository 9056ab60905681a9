//! Gateway error types.

use thiserror::Error;

/// Errors raised by a message provider.
///
/// These never escape [`DispatchGateway::submit`](super::DispatchGateway::submit);
/// they are folded into [`Outcome::ProviderError`](super::Outcome::ProviderError).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider did not answer within the configured timeout.
    #[error("Provider timed out after {secs}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },

    /// The request never reached the provider or the connection failed.
    #[error("Provider request failed: {0}")]
    Http(String),

    /// The provider answered with an error status.
    #[error("{message}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: u16,
        /// Error text reported by the provider.
        message: String,
    },

    /// The provider answered with something we could not interpret.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// The provider is missing credentials or settings.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}
