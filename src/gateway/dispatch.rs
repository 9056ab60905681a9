//! One send request, start to finish.
//!
//! Pipeline (first rejection wins):
//! 1. Input validation        -> `InvalidInput`
//! 2. Bot filter              -> `Forbidden`
//! 3. Quota / override        -> `QuotaExceeded`
//! 4. Length policy (normal)  -> `TooLong`
//! 5. Provider call (timeout) -> `Dispatched` | `ProviderError`
//!
//! The quota slot taken in step 3 is only kept when step 5 succeeds.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::GatewayConfig;
use super::error::ProviderError;
use super::guard::{AbuseGuard, Admission, ClientKey};
use super::provider::MessageProvider;

/// Which length policy applies to a request.
///
/// Parsed case-insensitively, from JSON and from the command line alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SendMode {
    /// Plain text, capped at the normal-mode length.
    #[default]
    Normal,
    /// Zero-width carrier, no server-side ceiling.
    Invisible,
}

impl fmt::Display for SendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Invisible => "invisible",
        })
    }
}

impl FromStr for SendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "invisible" => Ok(Self::Invisible),
            other => Err(format!("unknown mode '{other}' (expected normal or invisible)")),
        }
    }
}

impl TryFrom<String> for SendMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    /// Observed network address.
    pub addr: IpAddr,
    /// Per-browser identifier (empty if the client sent none).
    pub browser_id: String,
    /// Declared user agent.
    pub user_agent: String,
}

impl ClientContext {
    pub fn key(&self) -> ClientKey {
        ClientKey::new(self.addr, self.browser_id.clone())
    }
}

/// A send request as submitted to the gateway.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub destination: String,
    /// Carrier string or plain text depending on `mode`.
    pub body: String,
    pub mode: SendMode,
    pub override_credential: Option<String>,
    pub client: ClientContext,
}

/// Final classification of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Missing destination or body.
    InvalidInput,
    /// Bot signature detected.
    Forbidden,
    /// Normal-mode body over the limit.
    TooLong { len: usize, max: usize },
    /// Quota used up; a valid override credential would be accepted.
    QuotaExceeded { count: u32, limit: u32 },
    /// Provider accepted the message.
    Dispatched {
        message_id: String,
        /// True if the quota was bypassed with the override credential.
        overridden: bool,
    },
    /// Provider call failed or timed out. Quota was not consumed.
    ProviderError { detail: String },
}

impl Outcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }

    /// Stable lowercase name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Forbidden => "forbidden",
            Self::TooLong { .. } => "too_long",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Dispatched { .. } => "dispatched",
            Self::ProviderError { .. } => "provider_error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "Invalid input"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::TooLong { max, .. } => write!(f, "Message must be {max} chars or less"),
            Self::QuotaExceeded { .. } => {
                write!(f, "Send limit reached. Enter the password to send more.")
            }
            Self::Dispatched { message_id, .. } => write!(f, "SMS sent! ({message_id})"),
            Self::ProviderError { detail } => write!(f, "{detail}"),
        }
    }
}

/// Orchestrates validation, abuse policy and provider dispatch.
pub struct DispatchGateway {
    guard: AbuseGuard,
    provider: Arc<dyn MessageProvider>,
    max_normal_len: usize,
    provider_timeout: Duration,
}

impl DispatchGateway {
    pub fn new(config: &GatewayConfig, provider: Arc<dyn MessageProvider>) -> Self {
        Self {
            guard: AbuseGuard::new(config),
            provider,
            max_normal_len: config.max_normal_len,
            provider_timeout: config.provider_timeout(),
        }
    }

    pub fn guard(&self) -> &AbuseGuard {
        &self.guard
    }

    /// Classifies and, if permitted, dispatches one request.
    ///
    /// Always completes with a definite outcome; provider failures are
    /// reported, never propagated.
    pub async fn submit(&self, request: &DispatchRequest) -> Outcome {
        let outcome = self.run(request).await;
        info!(
            ip = %request.client.addr,
            mode = %request.mode,
            outcome = outcome.kind(),
            "send request handled"
        );
        outcome
    }

    async fn run(&self, request: &DispatchRequest) -> Outcome {
        if request.destination.trim().is_empty() || request.body.is_empty() {
            return Outcome::InvalidInput;
        }

        if self.guard.is_bot(&request.client.user_agent) {
            warn!(ip = %request.client.addr, "blocked automated client");
            return Outcome::Forbidden;
        }

        let key = request.client.key();
        let reservation = match self
            .guard
            .admit(&key, request.override_credential.as_deref())
        {
            Admission::Reserved(reservation) => Some(reservation),
            Admission::Overridden => None,
            Admission::Exhausted { count, limit } => {
                return Outcome::QuotaExceeded { count, limit };
            }
        };

        if request.mode == SendMode::Normal {
            let len = request.body.chars().count();
            if len > self.max_normal_len {
                return Outcome::TooLong {
                    len,
                    max: self.max_normal_len,
                };
            }
        }

        debug!(
            provider = self.provider.name(),
            destination = %request.destination,
            "dispatching"
        );

        match self.dispatch(&request.destination, &request.body).await {
            Ok(message_id) => {
                let overridden = reservation.is_none();
                if let Some(reservation) = reservation {
                    reservation.commit();
                }
                Outcome::Dispatched {
                    message_id,
                    overridden,
                }
            }
            Err(err) => {
                warn!(provider = self.provider.name(), error = %err, "dispatch failed");
                Outcome::ProviderError {
                    detail: err.to_string(),
                }
            }
        }
    }

    async fn dispatch(&self, destination: &str, body: &str) -> Result<String, ProviderError> {
        tokio::time::timeout(self.provider_timeout, self.provider.send(destination, body))
            .await
            .map_err(|_| ProviderError::Timeout {
                secs: self.provider_timeout.as_secs(),
            })?
    }
}
