//! Keyed store of outstanding authentication challenges.
//!
//! The store is the only mutable shared state in the core and is injected
//! into the orchestrator as a trait object, so deployments can substitute a
//! distributed key-value backend. The bundled implementation keeps one
//! record per wallet address in a mutex-guarded map: `consume` is a single
//! check-and-remove under the lock, which makes two racing verification
//! attempts for the same address resolve to exactly one winner.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::AuthConfig;
use crate::crypto::challenge::Challenge;

/// Issuance and atomic consumption of per-address challenges.
pub trait ChallengeStore: Send + Sync {
    /// Mint and persist a challenge for the address, overwriting any prior
    /// unconsumed one. Only the newest challenge is ever valid.
    fn issue(&self, wallet_address: &str) -> Challenge;

    /// Atomically read *and delete* the stored challenge. Returns `None`
    /// for a missing or TTL-expired entry; an expired entry is dropped,
    /// never returned.
    fn consume(&self, wallet_address: &str) -> Option<Challenge>;

    /// The time-to-live applied to issued challenges.
    fn ttl_seconds(&self) -> i64;
}

/// Process-local challenge store.
pub struct InMemoryChallengeStore {
    config: AuthConfig,
    entries: Mutex<HashMap<String, Challenge>>,
}

impl InMemoryChallengeStore {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop entries whose TTL has elapsed, returning how many were removed.
    ///
    /// Expiry is already enforced on `consume`; this is housekeeping for
    /// long-running processes where abandoned challenges would otherwise
    /// accumulate until their address retries.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.config.challenge_ttl;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, challenge| !challenge.is_expired(ttl));
        before - entries.len()
    }

    /// Number of live entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ChallengeStore for InMemoryChallengeStore {
    fn issue(&self, wallet_address: &str) -> Challenge {
        let challenge = Challenge::new(
            wallet_address,
            &self.config.app_name,
            self.config.challenge_ttl,
        );
        self.entries
            .lock()
            .insert(wallet_address.to_owned(), challenge.clone());
        challenge
    }

    fn consume(&self, wallet_address: &str) -> Option<Challenge> {
        let challenge = self.entries.lock().remove(wallet_address)?;
        if challenge.is_expired(self.config.challenge_ttl) {
            debug!(wallet = wallet_address, "stored challenge had expired");
            return None;
        }
        Some(challenge)
    }

    fn ttl_seconds(&self) -> i64 {
        self.config.challenge_ttl
    }
}
