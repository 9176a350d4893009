use std::fmt;

/// Authentication and cryptographic operation errors
///
/// Every failure of the challenge/verify protocol surfaces as a distinct,
/// user-actionable variant. Failures of individual recovery-id candidates
/// inside the recovery engine are expected and are never surfaced on their
/// own; only the aggregate outcome is.
///
/// # Example
/// ```rust
/// use stacks_auth::{AuthError, Result};
///
/// fn handle_auth_result(result: Result<()>) {
///     match result {
///         Ok(()) => println!("Operation successful"),
///         Err(AuthError::ChallengeExpiredOrMissing) => println!("Request a new challenge"),
///         Err(AuthError::SignatureInvalid(kind)) => println!("Rejected: {}", kind),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Debug)]
pub enum AuthError {
    /// The wallet address does not have the expected network shape
    ///
    /// This error occurs when:
    /// - The address does not start with `SP` (mainnet) or `ST` (testnet)
    /// - The payload contains characters outside the c32 alphabet
    /// - The payload fails to decode, or its checksum does not match
    InvalidAddress(String),

    /// No live challenge exists for the wallet address
    ///
    /// This error occurs when:
    /// - No challenge was ever issued for the address
    /// - The challenge's time-to-live has elapsed
    /// - The challenge was already consumed by a prior verification attempt
    ChallengeExpiredOrMissing,

    /// The submitted message differs from the issued challenge text
    ///
    /// The comparison is byte-for-byte. The challenge is consumed before
    /// this check runs, so the client must request a fresh challenge.
    MessageMismatch,

    /// The signature string could not be reduced to a 64-byte (r,s) pair
    MalformedSignature(SignatureFormatError),

    /// The signature is well-formed but does not prove ownership of the
    /// claimed address
    SignatureInvalid(SignatureRejection),

    /// JWT token is invalid, malformed, or has wrong signature
    InvalidToken,

    /// Token has expired
    ///
    /// This error occurs when the JWT's expiration timestamp
    /// is in the past relative to the current time.
    ExpiredToken,

    /// JWT creation or parsing error
    JwtError(String),

    /// A failure inside the account collaborator
    AccountError(String),

    /// Unexpected internal cryptographic fault
    ///
    /// Reserved for library errors unrelated to input shape (for example
    /// the secondary verification backend rejecting material the primary
    /// accepted). Never used for well-formed-but-wrong signatures.
    CryptoError(String),
}

/// Why a signature string failed to parse
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureFormatError {
    /// The input (after stripping an optional `0x` prefix) is not valid hex
    MalformedEncoding(String),
    /// The decoded byte length cannot carry a 64-byte (r,s) pair
    InvalidLength(usize),
}

/// Why a parsed signature was rejected by the recovery engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureRejection {
    /// No candidate across all recovery ids and both networks produced a
    /// key whose derived address matches the claim
    NoRecoveryCandidateMatched,
    /// A recovered key matched the address but the independent
    /// non-recovering verification of (r,s) against it failed
    IndependentVerificationFailed,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidAddress(msg) => {
                write!(f, "Invalid wallet address: {msg}")
            }
            AuthError::ChallengeExpiredOrMissing => {
                write!(
                    f,
                    "Invalid or expired challenge, request a new authentication message"
                )
            }
            AuthError::MessageMismatch => {
                write!(f, "Message does not match the issued challenge")
            }
            AuthError::MalformedSignature(kind) => {
                write!(f, "Malformed signature: {kind}")
            }
            AuthError::SignatureInvalid(kind) => {
                write!(f, "Signature verification failed: {kind}")
            }
            AuthError::InvalidToken => {
                write!(f, "Invalid or malformed JWT token")
            }
            AuthError::ExpiredToken => {
                write!(f, "Token has expired")
            }
            AuthError::JwtError(msg) => {
                write!(f, "JWT error: {msg}")
            }
            AuthError::AccountError(msg) => {
                write!(f, "Account store error: {msg}")
            }
            AuthError::CryptoError(msg) => {
                write!(f, "Cryptographic error: {msg}")
            }
        }
    }
}

impl fmt::Display for SignatureFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureFormatError::MalformedEncoding(msg) => {
                write!(f, "not a valid hex string: {msg}")
            }
            SignatureFormatError::InvalidLength(len) => {
                write!(f, "decoded to {len} bytes, expected 64 or 65")
            }
        }
    }
}

impl fmt::Display for SignatureRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureRejection::NoRecoveryCandidateMatched => {
                write!(f, "no recovered public key matches the claimed address")
            }
            SignatureRejection::IndependentVerificationFailed => {
                write!(
                    f,
                    "independent signature verification failed for the matched key"
                )
            }
        }
    }
}

impl std::error::Error for AuthError {}

pub type Result<T> = std::result::Result<T, AuthError>;
