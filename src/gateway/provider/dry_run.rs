//! Provider that delivers nothing.
//!
//! Used for local runs (`--dry-run`) and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use super::MessageProvider;
use crate::gateway::error::ProviderError;

/// Accepts every message and hands out `dry-run-<n>` ids.
#[derive(Debug, Default)]
pub struct DryRunProvider {
    sent: AtomicU64,
}

impl DryRunProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages accepted so far.
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageProvider for DryRunProvider {
    async fn send(&self, destination: &str, body: &str) -> Result<String, ProviderError> {
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(destination, id = n, "dry run destination");
        info!(
            id = n,
            chars = body.chars().count(),
            "dry run: message not delivered"
        );
        Ok(format!("dry-run-{n}"))
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
