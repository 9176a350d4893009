//! Wallet address derivation and validation.
//!
//! An address is a two-character network prefix (`SP` mainnet, `ST`
//! testnet) followed by the c32 encoding of a 25-byte payload:
//!
//! ```text
//! version (1 byte) ∥ RIPEMD160(SHA256(public_key)) (20 bytes) ∥ checksum (4 bytes)
//! ```
//!
//! where the checksum is the first four bytes of a double SHA-256 over
//! `version ∥ hash160`. Derivation is pure and deterministic, and address
//! comparison everywhere in this crate is exact string equality, never
//! case-insensitive.

use serde::{Deserialize, Serialize};

use crate::crypto::c32;
use crate::crypto::hash::{double_sha256, hash160};
use crate::error::{AuthError, Result};

/// P2PKH version byte for mainnet addresses.
pub const MAINNET_VERSION: u8 = 22;
/// P2PKH version byte for testnet addresses.
pub const TESTNET_VERSION: u8 = 26;

const HASH160_LEN: usize = 20;
const CHECKSUM_LEN: usize = 4;
const PAYLOAD_LEN: usize = 1 + HASH160_LEN + CHECKSUM_LEN;

/// Which network an address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Both networks, in the order the recovery engine tries them.
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    /// Two-character address prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            Network::Mainnet => "SP",
            Network::Testnet => "ST",
        }
    }

    /// Version byte embedded in the address payload.
    pub fn version_byte(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_VERSION,
            Network::Testnet => TESTNET_VERSION,
        }
    }

    /// Classify an address by its prefix.
    pub fn from_prefix(address: &str) -> Option<Network> {
        if address.starts_with("SP") {
            Some(Network::Mainnet)
        } else if address.starts_with("ST") {
            Some(Network::Testnet)
        } else {
            None
        }
    }
}

/// Derive the address for a public key.
///
/// `public_key` is the SEC1 encoding, 33 bytes compressed or 65 bytes
/// uncompressed; the bytes are hashed as given. Identical inputs always
/// yield identical output text.
///
/// # Example
/// ```rust
/// use stacks_auth::crypto::address::{derive_address, Network};
///
/// let address = derive_address(&[0x02; 33], Network::Mainnet);
/// assert!(address.starts_with("SP"));
/// assert_eq!(address, derive_address(&[0x02; 33], Network::Mainnet));
/// ```
pub fn derive_address(public_key: &[u8], network: Network) -> String {
    let key_hash = hash160(public_key);
    let mut payload = Vec::with_capacity(PAYLOAD_LEN);
    payload.push(network.version_byte());
    payload.extend_from_slice(&key_hash);
    let checksum = double_sha256(&payload);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    format!("{}{}", network.prefix(), c32::encode(&payload))
}

/// Decode an address back to its network and hash160, verifying the
/// version byte and checksum.
pub fn decode_address(address: &str) -> Result<(Network, [u8; HASH160_LEN])> {
    let network = Network::from_prefix(address)
        .ok_or_else(|| AuthError::InvalidAddress(format!("unknown prefix: {address}")))?;
    let payload = c32::decode(&address[2..])
        .map_err(|e| AuthError::InvalidAddress(e.to_string()))?;
    if payload.len() != PAYLOAD_LEN {
        return Err(AuthError::InvalidAddress(format!(
            "payload is {} bytes, expected {PAYLOAD_LEN}",
            payload.len()
        )));
    }
    if payload[0] != network.version_byte() {
        return Err(AuthError::InvalidAddress(format!(
            "version byte {} does not match the {} prefix",
            payload[0],
            network.prefix()
        )));
    }
    let checksum = double_sha256(&payload[..1 + HASH160_LEN]);
    if payload[1 + HASH160_LEN..] != checksum[..CHECKSUM_LEN] {
        return Err(AuthError::InvalidAddress("checksum mismatch".to_string()));
    }
    let mut key_hash = [0u8; HASH160_LEN];
    key_hash.copy_from_slice(&payload[1..1 + HASH160_LEN]);
    Ok((network, key_hash))
}

/// Cheap shape check used before issuing a challenge: known network prefix
/// and a non-empty, alphabet-clean payload. Does not verify the checksum.
pub fn validate_address_shape(address: &str) -> Result<Network> {
    let network = Network::from_prefix(address)
        .ok_or_else(|| AuthError::InvalidAddress(format!("unknown prefix: {address}")))?;
    let payload = &address[2..];
    if payload.is_empty() {
        return Err(AuthError::InvalidAddress("empty payload".to_string()));
    }
    if let Some(bad) = payload.chars().find(|&c| !c32::is_valid_symbol(c)) {
        return Err(AuthError::InvalidAddress(format!(
            "character {bad:?} is not in the c32 alphabet"
        )));
    }
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::hash160;

    const PUBKEY: [u8; 33] = [0x02; 33];

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_address(&PUBKEY, Network::Mainnet);
        let b = derive_address(&PUBKEY, Network::Mainnet);
        assert_eq!(a, b);
        assert!(a.starts_with("SP"));
        assert_eq!(a.len(), 42);
    }

    #[test]
    fn test_networks_diverge() {
        let mainnet = derive_address(&PUBKEY, Network::Mainnet);
        let testnet = derive_address(&PUBKEY, Network::Testnet);
        assert_ne!(mainnet, testnet);
        assert!(testnet.starts_with("ST"));
    }

    #[test]
    fn test_decode_round_trip() {
        let address = derive_address(&PUBKEY, Network::Testnet);
        let (network, key_hash) = decode_address(&address).unwrap();
        assert_eq!(network, Network::Testnet);
        assert_eq!(key_hash, hash160(&PUBKEY));
        // Re-deriving the text from the decoded payload yields the same string.
        let mut payload = vec![network.version_byte()];
        payload.extend_from_slice(&key_hash);
        let checksum = crate::crypto::hash::double_sha256(&payload);
        payload.extend_from_slice(&checksum[..4]);
        assert_eq!(
            format!("{}{}", network.prefix(), c32::encode(&payload)),
            address
        );
    }

    #[test]
    fn test_checksum_rejects_payload_mutation() {
        let address = derive_address(&PUBKEY, Network::Mainnet);
        let mut payload = c32::decode(&address[2..]).unwrap();
        // Flip one bit in every byte ahead of the checksum, one at a time.
        for index in 0..21 {
            payload[index] ^= 0x01;
            let mutated = format!("SP{}", c32::encode(&payload));
            assert!(
                matches!(decode_address(&mutated), Err(AuthError::InvalidAddress(_))),
                "mutation at byte {index} was not caught"
            );
            payload[index] ^= 0x01;
        }
    }

    #[test]
    fn test_shape_validation() {
        assert_eq!(
            validate_address_shape("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7").unwrap(),
            Network::Mainnet
        );
        assert_eq!(validate_address_shape("ST000000").unwrap(), Network::Testnet);
        assert!(validate_address_shape("SQ2J6ZY48GV1").is_err());
        assert!(validate_address_shape("SP").is_err());
        assert!(validate_address_shape("SPabc").is_err());
        assert!(validate_address_shape("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_version() {
        // Encode a testnet payload behind a mainnet prefix.
        let testnet = derive_address(&PUBKEY, Network::Testnet);
        let spliced = format!("SP{}", &testnet[2..]);
        assert!(decode_address(&spliced).is_err());
    }
}
