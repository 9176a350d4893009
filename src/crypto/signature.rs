//! Wallet signature parsing and public-key recovery.
//!
//! Wallet signing libraries emit several encodings of the same secp256k1
//! signature. Some prepend a one-byte format tag to the 64-byte (r,s) pair,
//! and none of them carry a usable recovery id, so verification has to try
//! all four candidate ids (and, because the claimed address may be on
//! either network, both address prefixes) until a recovered key derives
//! the claimed address. A match alone is not trusted: the (r,s) pair is
//! then verified against the matched key through a second, non-recovering
//! implementation before the signature is accepted.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use tracing::debug;

use crate::crypto::address::{derive_address, Network};
use crate::error::{AuthError, Result, SignatureFormatError, SignatureRejection};

/// Length of a canonical (r,s) signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// A signature normalized to its canonical (r,s) byte form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedSignature {
    /// The two curve scalars, big-endian, 32 bytes each.
    pub r_s: [u8; SIGNATURE_LEN],
    /// Recovery id if the encoding carried one; `None` means all four
    /// candidates must be tried.
    pub recovery_hint: Option<u8>,
}

/// A public key recovered from a signature, plus the context that produced
/// and matched it.
///
/// Only returned once the derived address equals the address under
/// verification *and* the signature independently verifies against the key.
#[derive(Clone, Debug)]
pub struct RecoveredKey {
    /// Compressed SEC1 encoding of the recovered key.
    pub public_key: [u8; 33],
    /// The recovery id that produced the match.
    pub recovery_id: u8,
    /// The network whose derived address matched.
    pub network: Network,
}

/// Parse a hex signature string into its canonical (r,s) form.
///
/// Accepts an optional `0x`/`0X` prefix. A 65-byte signature is treated as
/// a one-byte format tag followed by (r,s); the leading byte is *not* a
/// recovery id, so no hint is extracted. A 64-byte signature is used
/// directly. Longer inputs fall back to the trailing 64 bytes; this path is
/// experimental (no wallet is known to produce such signatures) and is
/// kept only as tolerance for padded encodings.
///
/// # Example
/// ```rust
/// use stacks_auth::crypto::signature::parse_signature;
///
/// let result = parse_signature("0x1234");
/// assert!(result.is_err());
///
/// let parsed = parse_signature(&"ab".repeat(65)).unwrap();
/// assert_eq!(parsed.recovery_hint, None);
/// ```
pub fn parse_signature(signature: &str) -> Result<ParsedSignature> {
    let stripped = signature
        .strip_prefix("0x")
        .or_else(|| signature.strip_prefix("0X"))
        .unwrap_or(signature);
    let bytes = hex::decode(stripped).map_err(|e| {
        AuthError::MalformedSignature(SignatureFormatError::MalformedEncoding(e.to_string()))
    })?;

    let r_s_bytes = match bytes.len() {
        SIGNATURE_LEN => &bytes[..],
        65 => &bytes[1..],
        len if len > 65 => &bytes[len - SIGNATURE_LEN..],
        len => {
            return Err(AuthError::MalformedSignature(
                SignatureFormatError::InvalidLength(len),
            ))
        }
    };

    let mut r_s = [0u8; SIGNATURE_LEN];
    r_s.copy_from_slice(r_s_bytes);
    Ok(ParsedSignature {
        r_s,
        recovery_hint: None,
    })
}

/// Recover the signer's public key and check it against a claimed address.
///
/// Tries every candidate recovery id (the hinted one if known, otherwise
/// 0–3). Each successfully recovered key is checked by deriving its mainnet
/// and testnet addresses and comparing against `claimed_address` with exact
/// string equality. On the first match the (r,s) pair is re-verified
/// against the matched key through a non-recovering backend; both checks
/// must pass. Candidates that fail to recover are skipped silently; only
/// the aggregate outcome surfaces.
pub fn recover_and_match(
    signature: &ParsedSignature,
    digest: &[u8; 32],
    claimed_address: &str,
) -> Result<RecoveredKey> {
    let parsed = Signature::from_slice(&signature.r_s).map_err(|_| {
        AuthError::SignatureInvalid(SignatureRejection::NoRecoveryCandidateMatched)
    })?;
    // Canonical low-S form, so recovery and the independent check agree.
    let parsed = parsed.normalize_s().unwrap_or(parsed);
    let mut r_s = [0u8; SIGNATURE_LEN];
    r_s.copy_from_slice(parsed.to_bytes().as_slice());

    let candidate_ids: Vec<u8> = match signature.recovery_hint {
        Some(id) => vec![id],
        None => vec![0, 1, 2, 3],
    };

    for id in candidate_ids {
        let Some(recovery_id) = RecoveryId::from_byte(id) else {
            continue;
        };
        let Ok(recovered) = VerifyingKey::recover_from_prehash(digest, &parsed, recovery_id)
        else {
            continue;
        };
        let mut public_key = [0u8; 33];
        public_key.copy_from_slice(recovered.to_encoded_point(true).as_bytes());

        for network in Network::ALL {
            if derive_address(&public_key, network) != claimed_address {
                continue;
            }
            debug!(recovery_id = id, network = ?network, "recovered key matches claimed address");
            if verify_independent(&r_s, digest, &public_key)? {
                return Ok(RecoveredKey {
                    public_key,
                    recovery_id: id,
                    network,
                });
            }
            return Err(AuthError::SignatureInvalid(
                SignatureRejection::IndependentVerificationFailed,
            ));
        }
    }

    Err(AuthError::SignatureInvalid(
        SignatureRejection::NoRecoveryCandidateMatched,
    ))
}

/// Non-recovering ECDSA verification of (r,s) against a known key.
///
/// Runs on a separate secp256k1 implementation from the recovery path, so
/// an inconsistency in either library cannot single-handedly authenticate
/// a signature.
fn verify_independent(
    r_s: &[u8; SIGNATURE_LEN],
    digest: &[u8; 32],
    public_key: &[u8; 33],
) -> Result<bool> {
    let message = libsecp256k1::Message::parse(digest);
    let signature = libsecp256k1::Signature::parse_standard(r_s)
        .map_err(|e| AuthError::CryptoError(format!("secondary signature parse failed: {e}")))?;
    let key = libsecp256k1::PublicKey::parse_compressed(public_key)
        .map_err(|e| AuthError::CryptoError(format!("secondary public key parse failed: {e}")))?;
    Ok(libsecp256k1::verify(&message, &signature, &key))
}
