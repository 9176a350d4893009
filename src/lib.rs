//! # stacks-auth
//!
//! A Rust library for **wallet challenge-response authentication** on
//! Stacks-style addresses. Clients prove ownership of a secp256k1 private
//! key by signing a single-use challenge message; the server recovers the
//! public key from the signature, derives the wallet address from it and
//! compares against the claim. No passwords, no client-supplied keys.
//!
//! ## Features
//!
//! - **Single-use challenges** - one live challenge per wallet address,
//!   TTL-bounded, consumed atomically on every verification attempt
//! - **Signature recovery** - all four recovery ids tried against both
//!   network prefixes, the way wallet signing libraries require
//! - **Independent double-check** - a recovered key is only trusted after
//!   the signature re-verifies through a second secp256k1 implementation
//! - **Injected collaborators** - challenge store, account store and
//!   credential issuer are traits, with in-memory/JWT defaults bundled
//! - **Comprehensive error handling** - every protocol failure is a
//!   distinct error kind
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use base64::prelude::*;
//! use secrecy::Secret;
//! use stacks_auth::{AuthConfig, AuthService, InMemoryAccountStore, JwtConfig, JwtIssuer};
//!
//! let jwt_config = JwtConfig {
//!     secret: Secret::new(BASE64_STANDARD.encode("your-secret-key")),
//!     ttl: 3600,           // 1 hour
//!     refresh_ttl: 86_400, // 24 hours
//! };
//! let service = AuthService::new(
//!     AuthConfig::new("my-app"),
//!     Arc::new(InMemoryAccountStore::new()),
//!     Arc::new(JwtIssuer::new(jwt_config)),
//! );
//!
//! // Step 1: the client asks for a challenge and signs `message` with
//! // their wallet.
//! let challenge = service
//!     .request_challenge("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7")
//!     .unwrap();
//! assert!(challenge.message.contains("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"));
//!
//! // Step 2: the signed message comes back for verification.
//! use stacks_auth::VerifyRequest;
//! let result = service.verify_and_authenticate(VerifyRequest {
//!     wallet_address: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7".to_string(),
//!     signature: "0x1234".to_string(), // a real wallet signature goes here
//!     message: challenge.message,
//! });
//! assert!(result.is_err()); // rejected without a valid signature
//! ```
//!
//! ## Demo
//!
//! See `demos/basic_workflow.rs` for a complete request-sign-verify cycle
//! with a locally generated key:
//!
//! ```bash
//! cargo run --example basic_workflow
//! ```

pub mod account;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod store;

// Re-export main types for easier access
pub use account::{Account, AccountStore, InMemoryAccountStore};
pub use auth::{
    AuthResponse, AuthService, ChallengeResponse, CredentialIssuer, TokenPair, VerifyRequest,
};
pub use config::{AuthConfig, JwtConfig};
pub use crypto::address::{derive_address, Network};
pub use crypto::challenge::Challenge;
pub use crypto::jwt::JwtIssuer;
pub use crypto::signature::{parse_signature, recover_and_match, ParsedSignature, RecoveredKey};
pub use error::{AuthError, Result, SignatureFormatError, SignatureRejection};
pub use store::{ChallengeStore, InMemoryChallengeStore};
