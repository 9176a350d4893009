//! Digest and checksum helpers shared by address derivation and signature
//! verification.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice, used for address checksums.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD160(SHA256(data)), the 20-byte core of address derivation.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(sha256(data)).into()
}

/// Digest of a signed message: SHA-256 over the raw UTF-8 bytes.
///
/// No domain-separation prefix is applied. The message text itself carries
/// the application name and nonce, so the hash sees exactly the bytes the
/// wallet signed.
pub fn message_digest(message: &str) -> [u8; 32] {
    sha256(message.as_bytes())
}
