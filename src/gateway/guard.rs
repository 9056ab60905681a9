//! Abuse prevention: bot filtering and per-client send quota.
//!
//! The quota check and the increment happen inside one per-key critical
//! section of the store, so concurrent requests from the same client can never
//! both observe a free slot. A reserved slot is handed out as a
//! [`QuotaReservation`] which gives the slot back when dropped uncommitted
//! (failed dispatch, rejected length, cancelled request).

use std::net::IpAddr;

use dashmap::DashMap;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::config::GatewayConfig;

/// Composite client identity used for quota tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey {
    /// Observed network address.
    pub addr: IpAddr,
    /// Opaque per-browser identifier (issued elsewhere).
    pub browser_id: String,
}

impl ClientKey {
    pub fn new(addr: IpAddr, browser_id: impl Into<String>) -> Self {
        Self {
            addr,
            browser_id: browser_id.into(),
        }
    }
}

/// In-memory, process-lifetime send counters.
#[derive(Debug)]
pub struct QuotaStore {
    counts: DashMap<ClientKey, u32>,
    limit: u32,
}

impl QuotaStore {
    pub fn new(limit: u32) -> Self {
        Self {
            counts: DashMap::new(),
            limit,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Current count for `key` (0 for unknown clients).
    pub fn count(&self, key: &ClientKey) -> u32 {
        self.counts.get(key).map(|c| *c).unwrap_or(0)
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Atomically checks the limit and takes a slot.
    ///
    /// Returns the reservation, or the current count when the limit is reached.
    pub fn try_reserve(&self, key: &ClientKey) -> Result<QuotaReservation<'_>, u32> {
        let mut count = self.counts.entry(key.clone()).or_insert_with(|| {
            debug!(ip = %key.addr, "tracking new client");
            0
        });

        if *count >= self.limit {
            return Err(*count);
        }
        *count += 1;

        Ok(QuotaReservation {
            store: self,
            key: key.clone(),
            committed: false,
        })
    }

    fn release(&self, key: &ClientKey) {
        if let Some(mut count) = self.counts.get_mut(key) {
            *count = count.saturating_sub(1);
        }
    }
}

/// A quota slot taken by [`QuotaStore::try_reserve`].
///
/// Dropping it without calling [`commit`](Self::commit) returns the slot.
#[derive(Debug)]
#[must_use = "an uncommitted reservation is released on drop"]
pub struct QuotaReservation<'a> {
    store: &'a QuotaStore,
    key: ClientKey,
    committed: bool,
}

impl QuotaReservation<'_> {
    /// Keeps the slot consumed.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for QuotaReservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.store.release(&self.key);
            debug!(ip = %self.key.addr, "released quota slot");
        }
    }
}

/// Result of the quota step.
#[derive(Debug)]
pub enum Admission<'a> {
    /// Under the limit; a slot is held until the send completes.
    Reserved(QuotaReservation<'a>),
    /// Over the limit, but the override password matched. Nothing is counted.
    Overridden,
    /// Over the limit and no valid override.
    Exhausted { count: u32, limit: u32 },
}

/// Per-request abuse policy.
#[derive(Debug)]
pub struct AbuseGuard {
    quota: QuotaStore,
    override_password: Option<String>,
    bot_signatures: Vec<String>,
}

impl AbuseGuard {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            quota: QuotaStore::new(config.quota_limit),
            override_password: config.override_password.clone(),
            bot_signatures: config
                .bot_signatures
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn quota(&self) -> &QuotaStore {
        &self.quota
    }

    /// True for an empty user agent or one containing a denylisted token.
    pub fn is_bot(&self, user_agent: &str) -> bool {
        let agent = user_agent.trim().to_ascii_lowercase();
        if agent.is_empty() {
            return true;
        }
        self.bot_signatures.iter().any(|sig| agent.contains(sig.as_str()))
    }

    /// Checks a candidate override credential against the configured secret.
    pub fn override_matches(&self, candidate: Option<&str>) -> bool {
        match (&self.override_password, candidate) {
            (Some(secret), Some(candidate)) => constant_time_compare(secret, candidate),
            _ => false,
        }
    }

    /// Runs the quota step for `key`.
    pub fn admit(&self, key: &ClientKey, override_credential: Option<&str>) -> Admission<'_> {
        match self.quota.try_reserve(key) {
            Ok(reservation) => Admission::Reserved(reservation),
            Err(count) if self.override_matches(override_credential) => {
                debug!(ip = %key.addr, count, "quota bypassed by override");
                Admission::Overridden
            }
            Err(count) => {
                if override_credential.is_some() {
                    warn!(ip = %key.addr, "rejected override credential");
                }
                Admission::Exhausted {
                    count,
                    limit: self.quota.limit(),
                }
            }
        }
    }
}

/// Constant-time string comparison.
///
/// Runs in time independent of how many leading bytes match. Inputs of
/// different length never compare equal.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let max_len = a.len().max(b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
