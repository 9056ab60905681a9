//! # Dispatch gateway
//!
//! Abuse-guarded sending of (usually invisible) messages through a provider.
//!
//! ## Policy
//!
//! - **Bot filter**: empty or denylisted user agents are refused
//! - **Per-client quota**: client = network address + browser identifier
//! - **Override password**: bypasses the quota without consuming it
//! - **Length policy**: normal-mode bodies are capped, invisible ones are not
//! - **Failed sends are free**: a provider error never consumes quota

mod config;
mod dispatch;
mod error;
mod guard;
pub mod http;
pub mod provider;

pub use config::{GatewayConfig, DEFAULT_BOT_SIGNATURES, DEFAULT_PROVIDER_TIMEOUT_SECS};
pub use dispatch::{ClientContext, DispatchGateway, DispatchRequest, Outcome, SendMode};
pub use error::{ConfigError, ProviderError};
pub use guard::{
    constant_time_compare, AbuseGuard, Admission, ClientKey, QuotaReservation, QuotaStore,
};
pub use provider::{DryRunProvider, MessageProvider, TwilioConfig, TwilioProvider};
