//! Challenge generation: high-entropy nonces and the deterministic message
//! text a wallet is asked to sign.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Nonce entropy in bytes; the nonce string is its hex encoding.
pub const NONCE_LEN: usize = 16;

/// One outstanding sign-in attempt.
///
/// At most one challenge is live per wallet address; issuing a new one
/// overwrites the old. The `message` is the exact byte-for-byte text the
/// wallet must sign; verification compares against it with string
/// equality, so it is never re-derived from the parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub wallet_address: String,
    pub nonce: String,
    /// Unix timestamp of issuance.
    pub issued_at: i64,
    pub message: String,
}

impl Challenge {
    /// Build a fresh challenge for `wallet_address`, stamped now.
    pub fn new(wallet_address: &str, app_name: &str, ttl_seconds: i64) -> Self {
        let nonce = generate_nonce();
        let issued_at = Utc::now().timestamp();
        let message = build_message(app_name, wallet_address, &nonce, issued_at, ttl_seconds);
        Self {
            wallet_address: wallet_address.to_owned(),
            nonce,
            issued_at,
            message,
        }
    }

    /// True once `ttl_seconds` have elapsed since issuance. The boundary
    /// itself counts as expired.
    pub fn is_expired(&self, ttl_seconds: i64) -> bool {
        Utc::now().timestamp() - self.issued_at >= ttl_seconds
    }
}

/// Generate a cryptographically secure random nonce, hex encoded.
pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let nonce_bytes: [u8; NONCE_LEN] = rng.r#gen();
    hex::encode(nonce_bytes)
}

/// Render the message text for signing.
///
/// The format is human-readable and includes anti-phishing elements: the
/// application name, the wallet address being authenticated, the nonce and
/// the issuance timestamp, plus an expiry note in whole minutes.
pub fn build_message(
    app_name: &str,
    wallet_address: &str,
    nonce: &str,
    issued_at: i64,
    ttl_seconds: i64,
) -> String {
    format!(
        "Sign this message to authenticate with {}.\n\n\
         Wallet: {}\n\
         Nonce: {}\n\
         Timestamp: {}\n\n\
         This request will expire in {} minutes.",
        app_name,
        wallet_address,
        nonce,
        issued_at,
        ttl_seconds / 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

    #[test]
    fn test_nonces_are_unique_hex() {
        let first = generate_nonce();
        let second = generate_nonce();
        assert_ne!(first, second);
        assert_eq!(first.len(), NONCE_LEN * 2);
        assert!(hex::decode(&first).is_ok());
    }

    #[test]
    fn test_message_carries_all_parts() {
        let challenge = Challenge::new(ADDRESS, "demo-app", 300);
        assert!(challenge.message.contains("demo-app"));
        assert!(challenge.message.contains(ADDRESS));
        assert!(challenge.message.contains(&challenge.nonce));
        assert!(challenge
            .message
            .contains(&challenge.issued_at.to_string()));
        assert!(challenge.message.contains("expire in 5 minutes"));
    }

    #[test]
    fn test_message_is_deterministic() {
        let a = build_message("demo-app", ADDRESS, "abc123", 1_700_000_000, 300);
        let b = build_message("demo-app", ADDRESS, "abc123", 1_700_000_000, 300);
        assert_eq!(a, b);
    }

    #[test]
    fn test_expiry_boundary() {
        let mut challenge = Challenge::new(ADDRESS, "demo-app", 300);
        assert!(!challenge.is_expired(300));
        assert!(challenge.is_expired(0));
        challenge.issued_at -= 300;
        assert!(challenge.is_expired(300));
    }
}
