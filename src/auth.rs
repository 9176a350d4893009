use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::account::{Account, AccountStore};
use crate::config::AuthConfig;
use crate::crypto::address::validate_address_shape;
use crate::crypto::hash::message_digest;
use crate::crypto::signature::{parse_signature, recover_and_match};
use crate::error::{AuthError, Result};
use crate::store::{ChallengeStore, InMemoryChallengeStore};

/// Authentication service for wallet-based challenge-response sign-in
///
/// The service is the protocol state machine with two entry points:
/// - [`request_challenge`](AuthService::request_challenge) mints a
///   single-use challenge for a wallet address
/// - [`verify_and_authenticate`](AuthService::verify_and_authenticate)
///   checks a submitted signature against the outstanding challenge and
///   hands off to the account and credential collaborators
///
/// It keeps no state of its own beyond the injected challenge store. All
/// three collaborators are trait objects so callers can substitute their
/// own backends; the bundled in-memory implementations cover tests, demos
/// and single-process deployments.
pub struct AuthService {
    config: AuthConfig,
    challenges: Arc<dyn ChallengeStore>,
    accounts: Arc<dyn AccountStore>,
    credentials: Arc<dyn CredentialIssuer>,
}

/// Issues opaque session credentials for an authenticated account.
///
/// The core treats the tokens as opaque text; the bundled
/// [`JwtIssuer`](crate::crypto::jwt::JwtIssuer) is one implementation.
pub trait CredentialIssuer: Send + Sync {
    fn issue(&self, account: &Account) -> Result<TokenPair>;
}

/// Access/refresh token pair, opaque to this crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response to a challenge request
///
/// `nonce` is exposed for observability only; callers must treat the
/// `message` as the unit the wallet signs and must not parse the nonce
/// back out of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub message: String,
    pub nonce: String,
    /// Seconds until the challenge expires
    pub expires_in: i64,
}

/// Request structure for verifying a signed challenge
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub wallet_address: String,
    /// Hex signature, optionally `0x`-prefixed
    pub signature: String,
    /// The exact message text previously issued
    pub message: String,
}

/// Response structure containing authentication results
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub account: Account,
    /// Whether the account was created by this authentication
    pub is_new: bool,
    pub tokens: TokenPair,
}

impl AuthService {
    /// Create a service backed by an in-memory challenge store.
    pub fn new(
        config: AuthConfig,
        accounts: Arc<dyn AccountStore>,
        credentials: Arc<dyn CredentialIssuer>,
    ) -> Self {
        let challenges = Arc::new(InMemoryChallengeStore::new(config.clone()));
        Self::with_challenge_store(config, challenges, accounts, credentials)
    }

    /// Create a service with an explicit challenge store, for deployments
    /// that need challenges shared across processes.
    pub fn with_challenge_store(
        config: AuthConfig,
        challenges: Arc<dyn ChallengeStore>,
        accounts: Arc<dyn AccountStore>,
        credentials: Arc<dyn CredentialIssuer>,
    ) -> Self {
        Self {
            config,
            challenges,
            accounts,
            credentials,
        }
    }

    /// Issue a single-use challenge for a wallet address.
    ///
    /// Overwrites any prior unconsumed challenge for the same address. The
    /// caller forwards `message` to the wallet for signing and keeps
    /// nothing else; verification takes the message back verbatim.
    ///
    /// # Errors
    /// - `InvalidAddress`: the address lacks a known network prefix or
    ///   contains characters outside the c32 alphabet
    pub fn request_challenge(&self, wallet_address: &str) -> Result<ChallengeResponse> {
        validate_address_shape(wallet_address)?;
        let challenge = self.challenges.issue(wallet_address);
        debug!(wallet = wallet_address, app = %self.config.app_name, "issued challenge");
        Ok(ChallengeResponse {
            message: challenge.message,
            nonce: challenge.nonce,
            expires_in: self.challenges.ttl_seconds(),
        })
    }

    /// Verify a signed challenge and authenticate the wallet.
    ///
    /// The stored challenge is consumed up front, so every outcome,
    /// success or any failure, invalidates it; after a failure the client
    /// must request a fresh challenge and re-sign. Checks run in order:
    ///
    /// 1. a live challenge exists for the address
    /// 2. the submitted message is byte-for-byte the issued one
    /// 3. the issued nonce appears in the message
    /// 4. the signature parses to a canonical (r,s) pair
    /// 5. a recovered key derives the claimed address and the signature
    ///    independently verifies against it
    ///
    /// On success the account collaborator resolves (or creates) the
    /// account and the credential collaborator issues a session token pair.
    ///
    /// # Errors
    /// - `ChallengeExpiredOrMissing`, `MessageMismatch`,
    ///   `MalformedSignature`, `SignatureInvalid`: one per failed step
    pub fn verify_and_authenticate(&self, request: VerifyRequest) -> Result<AuthResponse> {
        let challenge = self
            .challenges
            .consume(&request.wallet_address)
            .ok_or_else(|| {
                warn!(wallet = %request.wallet_address, "no live challenge for address");
                AuthError::ChallengeExpiredOrMissing
            })?;

        if challenge.message != request.message {
            warn!(wallet = %request.wallet_address, "submitted message differs from issued challenge");
            return Err(AuthError::MessageMismatch);
        }

        // Redundant while the check above compares exactly; kept so a
        // relaxation of the message comparison cannot drop the nonce.
        if !request.message.contains(&challenge.nonce) {
            warn!(wallet = %request.wallet_address, "issued nonce missing from message");
            return Err(AuthError::MessageMismatch);
        }

        let parsed = parse_signature(&request.signature).map_err(|err| {
            warn!(wallet = %request.wallet_address, %err, "signature failed to parse");
            err
        })?;

        let digest = message_digest(&request.message);
        let recovered =
            recover_and_match(&parsed, &digest, &request.wallet_address).map_err(|err| {
                warn!(wallet = %request.wallet_address, %err, "signature verification failed");
                err
            })?;

        let (account, created) = self.accounts.get_or_create(&request.wallet_address)?;
        let tokens = self.credentials.issue(&account)?;
        info!(
            wallet = %request.wallet_address,
            recovery_id = recovered.recovery_id,
            is_new = created,
            "wallet authenticated"
        );
        Ok(AuthResponse {
            account,
            is_new: created,
            tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::InMemoryAccountStore;
    use crate::config::JwtConfig;
    use crate::crypto::address::{derive_address, Network};
    use crate::crypto::jwt::JwtIssuer;
    use crate::error::{SignatureFormatError, SignatureRejection};
    use base64::prelude::*;
    use k256::ecdsa::SigningKey;
    use secrecy::Secret;
    use std::thread;

    fn test_service(challenge_ttl: i64) -> (AuthService, Arc<JwtIssuer>) {
        let config = AuthConfig {
            app_name: "demo-app".to_string(),
            challenge_ttl,
        };
        let issuer = Arc::new(JwtIssuer::new(JwtConfig {
            secret: Secret::new(BASE64_STANDARD.encode("test-secret-key")),
            ttl: 3600,
            refresh_ttl: 86_400,
        }));
        let service = AuthService::new(
            config,
            Arc::new(InMemoryAccountStore::new()),
            issuer.clone(),
        );
        (service, issuer)
    }

    fn test_wallet() -> (SigningKey, String) {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = derive_address(
            key.verifying_key().to_encoded_point(true).as_bytes(),
            Network::Mainnet,
        );
        (key, address)
    }

    /// Sign a message the way a wallet does: 65 hex-encoded bytes, a
    /// leading type byte ahead of (r,s), with a 0x prefix.
    fn sign_message(key: &SigningKey, message: &str) -> String {
        let digest = message_digest(message);
        let (signature, _) = key.sign_prehash_recoverable(&digest).unwrap();
        let mut bytes = vec![0x00u8];
        bytes.extend_from_slice(signature.to_bytes().as_slice());
        format!("0x{}", hex::encode(bytes))
    }

    fn run_cycle(service: &AuthService, key: &SigningKey, address: &str) -> Result<AuthResponse> {
        let challenge = service.request_challenge(address)?;
        service.verify_and_authenticate(VerifyRequest {
            wallet_address: address.to_string(),
            signature: sign_message(key, &challenge.message),
            message: challenge.message,
        })
    }

    #[test]
    fn test_request_challenge_validates_address() {
        let (service, _) = test_service(300);
        assert!(matches!(
            service.request_challenge("0x8ba1f109551bd432803012645ac136ddd64dba72"),
            Err(AuthError::InvalidAddress(_))
        ));
        assert!(matches!(
            service.request_challenge("SPabc"),
            Err(AuthError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_challenge_response_shape() {
        let (service, _) = test_service(300);
        let (_, address) = test_wallet();
        let challenge = service.request_challenge(&address).unwrap();
        assert_eq!(challenge.expires_in, 300);
        assert!(challenge.message.contains(&address));
        assert!(challenge.message.contains(&challenge.nonce));
    }

    #[test]
    fn test_end_to_end_authentication() {
        let (service, issuer) = test_service(300);
        let (key, address) = test_wallet();

        let first = run_cycle(&service, &key, &address).unwrap();
        assert!(first.is_new);
        assert_eq!(first.account.wallet_address, address);

        let claims = issuer.validate(&first.tokens.access).unwrap();
        assert_eq!(claims.sub, first.account.id);
        assert_eq!(claims.wallet, address);

        let second = run_cycle(&service, &key, &address).unwrap();
        assert!(!second.is_new);
        assert_eq!(second.account.id, first.account.id);
    }

    #[test]
    fn test_challenge_is_single_use() {
        let (service, _) = test_service(300);
        let (key, address) = test_wallet();

        let challenge = service.request_challenge(&address).unwrap();
        let request = VerifyRequest {
            wallet_address: address.clone(),
            signature: sign_message(&key, &challenge.message),
            message: challenge.message,
        };

        assert!(service.verify_and_authenticate(request.clone()).is_ok());
        assert!(matches!(
            service.verify_and_authenticate(request),
            Err(AuthError::ChallengeExpiredOrMissing)
        ));
    }

    #[test]
    fn test_reissue_invalidates_prior_challenge() {
        let (service, _) = test_service(300);
        let (key, address) = test_wallet();

        let first = service.request_challenge(&address).unwrap();
        let _second = service.request_challenge(&address).unwrap();

        let result = service.verify_and_authenticate(VerifyRequest {
            wallet_address: address.clone(),
            signature: sign_message(&key, &first.message),
            message: first.message,
        });
        assert!(matches!(result, Err(AuthError::MessageMismatch)));
    }

    #[test]
    fn test_expired_challenge_is_missing() {
        let (service, _) = test_service(0);
        let (key, address) = test_wallet();

        let challenge = service.request_challenge(&address).unwrap();
        let result = service.verify_and_authenticate(VerifyRequest {
            wallet_address: address.clone(),
            signature: sign_message(&key, &challenge.message),
            message: challenge.message,
        });
        assert!(matches!(result, Err(AuthError::ChallengeExpiredOrMissing)));
    }

    #[test]
    fn test_altered_message_is_rejected_and_consumes() {
        let (service, _) = test_service(300);
        let (key, address) = test_wallet();

        let challenge = service.request_challenge(&address).unwrap();
        let mut altered = challenge.message.clone();
        altered.pop();
        altered.push('X');

        let result = service.verify_and_authenticate(VerifyRequest {
            wallet_address: address.clone(),
            signature: sign_message(&key, &altered),
            message: altered,
        });
        assert!(matches!(result, Err(AuthError::MessageMismatch)));

        // The failure consumed the challenge; the original no longer works.
        let retry = service.verify_and_authenticate(VerifyRequest {
            wallet_address: address.clone(),
            signature: sign_message(&key, &challenge.message),
            message: challenge.message,
        });
        assert!(matches!(retry, Err(AuthError::ChallengeExpiredOrMissing)));
    }

    #[test]
    fn test_malformed_signature() {
        let (service, _) = test_service(300);
        let (_, address) = test_wallet();

        let challenge = service.request_challenge(&address).unwrap();
        let result = service.verify_and_authenticate(VerifyRequest {
            wallet_address: address.clone(),
            signature: "0x1234".to_string(),
            message: challenge.message,
        });
        assert!(matches!(
            result,
            Err(AuthError::MalformedSignature(
                SignatureFormatError::InvalidLength(2)
            ))
        ));
    }

    #[test]
    fn test_signature_from_wrong_key() {
        let (service, _) = test_service(300);
        let (_, address) = test_wallet();
        let (other_key, _) = test_wallet();

        let challenge = service.request_challenge(&address).unwrap();
        let result = service.verify_and_authenticate(VerifyRequest {
            wallet_address: address.clone(),
            signature: sign_message(&other_key, &challenge.message),
            message: challenge.message,
        });
        assert!(matches!(
            result,
            Err(AuthError::SignatureInvalid(
                SignatureRejection::NoRecoveryCandidateMatched
            ))
        ));
    }

    #[test]
    fn test_concurrent_verification_has_one_winner() {
        let (service, _) = test_service(300);
        let service = Arc::new(service);
        let (key, address) = test_wallet();

        let challenge = service.request_challenge(&address).unwrap();
        let request = VerifyRequest {
            wallet_address: address.clone(),
            signature: sign_message(&key, &challenge.message),
            message: challenge.message,
        };

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = Arc::clone(&service);
                let request = request.clone();
                thread::spawn(move || service.verify_and_authenticate(request))
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, Err(AuthError::ChallengeExpiredOrMissing)))
                .count(),
            1
        );
    }

    #[test]
    fn test_response_serializes_for_the_wire() {
        let (service, _) = test_service(300);
        let (key, address) = test_wallet();

        let response = run_cycle(&service, &key, &address).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["is_new"], true);
        assert_eq!(json["account"]["wallet_address"], address.as_str());
        assert!(json["tokens"]["access"].is_string());
        assert!(json["tokens"]["refresh"].is_string());
    }
}
