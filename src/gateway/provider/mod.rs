//! Outbound message providers.
//!
//! This module defines the async provider trait and implementations for
//! different delivery backends.

mod dry_run;
mod twilio;

pub use dry_run::DryRunProvider;
pub use twilio::{TwilioConfig, TwilioProvider, DEFAULT_TWILIO_API_BASE};

use async_trait::async_trait;

use super::error::ProviderError;

/// Trait for a message delivery backend.
///
/// Delivery guarantees, retries and carrier-level truncation are the
/// provider's business; the gateway only needs an id or an error.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Send `body` to `destination`, returning the provider's message id.
    async fn send(&self, destination: &str, body: &str) -> Result<String, ProviderError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
