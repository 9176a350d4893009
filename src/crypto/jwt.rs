//! Default credential issuer: HS256 JWT access/refresh token pairs.
//!
//! The orchestrator only depends on the [`CredentialIssuer`] trait; this
//! module is the bundled implementation for deployments that do not bring
//! their own session backend.

use base64::prelude::*;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::Account;
use crate::auth::{CredentialIssuer, TokenPair};
use crate::config::JwtConfig;
use crate::error::{AuthError, Result};

/// `typ` claim value of access tokens.
pub const ACCESS_TOKEN: &str = "access";
/// `typ` claim value of refresh tokens.
pub const REFRESH_TOKEN: &str = "refresh";

/// JWT claims structure for authenticated sessions
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Account identifier
    pub sub: Uuid,
    /// Wallet address the session was authenticated with
    pub wallet: String,
    /// Token type, [`ACCESS_TOKEN`] or [`REFRESH_TOKEN`]
    pub typ: String,
    /// Expiration timestamp (Unix timestamp)
    pub exp: i64,
    /// Issued at timestamp (Unix timestamp)
    pub iat: i64,
}

/// Issues and validates HS256 token pairs for authenticated accounts.
pub struct JwtIssuer {
    config: JwtConfig,
}

impl JwtIssuer {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Create a single signed token of the given type and lifetime.
    pub fn create_token(&self, account: &Account, token_type: &str, ttl: i64) -> Result<String> {
        let jwt_secret = decode_secret(self.config.secret.expose_secret())?;
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: account.id,
            wallet: account.wallet_address.clone(),
            typ: token_type.to_string(),
            exp: now + ttl,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&jwt_secret),
        )
        .map_err(|e| AuthError::JwtError(format!("Failed to create JWT: {e}")))
    }

    /// Validate a token and extract its claims.
    ///
    /// Checks the signature, structure and expiry. Callers that care which
    /// half of the pair they were handed should also check `claims.typ`.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let jwt_secret = decode_secret(self.config.secret.expose_secret())?;
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&jwt_secret),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidToken => AuthError::InvalidToken,
            _ => AuthError::JwtError(format!("JWT validation failed: {e}")),
        })?;
        let claims = token_data.claims;
        // The decoder applies leeway to `exp`; sessions get none.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }
}

impl CredentialIssuer for JwtIssuer {
    fn issue(&self, account: &Account) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.create_token(account, ACCESS_TOKEN, self.config.ttl)?,
            refresh: self.create_token(account, REFRESH_TOKEN, self.config.refresh_ttl)?,
        })
    }
}

fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(secret)
        .map_err(|e| AuthError::JwtError(format!("Failed to decode JWT secret: {e}")))
}
