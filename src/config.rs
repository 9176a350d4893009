use secrecy::Secret;
use serde::Deserialize;

/// Default challenge time-to-live in seconds (5 minutes).
pub const DEFAULT_CHALLENGE_TTL: i64 = 300;

/// Configuration for challenge issuance
///
/// The `app_name` is embedded in every challenge message so the user's
/// wallet shows which application is asking for a signature. The wallet
/// UI displays the full text, which is an anti-phishing measure.
///
/// # Example
/// ```rust
/// use stacks_auth::AuthConfig;
///
/// let config = AuthConfig::new("my-app");
/// assert_eq!(config.challenge_ttl, 300);
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    /// Human-readable application name shown in the challenge message
    pub app_name: String,
    /// Challenge time-to-live in seconds
    ///
    /// A challenge older than this is treated as absent by the store.
    /// The value is also rendered (in whole minutes) into the expiry note
    /// of the challenge message, so keep it a multiple of 60.
    pub challenge_ttl: i64,
}

impl AuthConfig {
    /// Create a configuration with the default 5-minute challenge TTL
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            challenge_ttl: DEFAULT_CHALLENGE_TTL,
        }
    }
}

/// Configuration for JWT token creation and validation
///
/// # Security Note
/// The secret should be a strong, randomly generated key. For production use,
/// generate at least 256 bits of random data and encode it as base64.
///
/// # Example
/// ```rust
/// use stacks_auth::JwtConfig;
/// use secrecy::Secret;
/// use base64::prelude::*;
///
/// let config = JwtConfig {
///     secret: Secret::new(BASE64_STANDARD.encode("your-256-bit-secret-key")),
///     ttl: 3600,           // 1 hour access tokens
///     refresh_ttl: 86_400, // 24 hour refresh tokens
/// };
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct JwtConfig {
    /// JWT secret key, base64 encoded string
    ///
    /// Used to sign and verify both tokens of the issued pair. Keep it out
    /// of version control.
    pub secret: Secret<String>,
    /// Access token lifetime in seconds
    pub ttl: i64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl: i64,
}
