// demos/basic_workflow.rs
//
// Complete challenge-response cycle against a locally generated wallet key:
// request a challenge, sign its message the way a wallet would, verify, and
// print the issued session tokens.

use std::sync::Arc;

use base64::prelude::*;
use k256::ecdsa::SigningKey;
use secrecy::Secret;
use stacks_auth::crypto::hash::message_digest;
use stacks_auth::{
    derive_address, AuthConfig, AuthService, InMemoryAccountStore, JwtConfig, JwtIssuer, Network,
    VerifyRequest,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("stacks-auth basic workflow");

    // 1. Setup the authentication service with the bundled collaborators
    let jwt_config = JwtConfig {
        secret: Secret::new(BASE64_STANDARD.encode("example-secret-key")),
        ttl: 3600,
        refresh_ttl: 86_400,
    };
    let service = AuthService::new(
        AuthConfig::new("example-app"),
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(JwtIssuer::new(jwt_config)),
    );

    // 2. Simulate a wallet: a fresh secp256k1 key and its mainnet address
    let wallet_key = SigningKey::random(&mut rand::thread_rng());
    let wallet_address = derive_address(
        wallet_key.verifying_key().to_encoded_point(true).as_bytes(),
        Network::Mainnet,
    );
    println!("Wallet address: {wallet_address}");

    // 3. Request a challenge
    let challenge = service.request_challenge(&wallet_address)?;
    println!("\nChallenge message:\n{}", challenge.message);
    println!("\nExpires in {} seconds", challenge.expires_in);

    // 4. Sign the message the way a wallet does: 65 bytes, a leading type
    //    byte ahead of the 64-byte (r,s) pair, hex with a 0x prefix
    let digest = message_digest(&challenge.message);
    let (signature, _) = wallet_key.sign_prehash_recoverable(&digest)?;
    let mut signature_bytes = vec![0x00u8];
    signature_bytes.extend_from_slice(signature.to_bytes().as_slice());
    let signature_hex = format!("0x{}", hex::encode(signature_bytes));
    println!("\nSignature: {}...", &signature_hex[..18]);

    // 5. Verify and authenticate
    let response = service.verify_and_authenticate(VerifyRequest {
        wallet_address: wallet_address.clone(),
        signature: signature_hex,
        message: challenge.message,
    })?;
    println!("\nAuthenticated!");
    println!("{}", serde_json::to_string_pretty(&response)?);

    // 6. A second attempt with the same challenge is rejected; challenges
    //    are single-use
    let replay = service.request_challenge(&wallet_address)?;
    println!(
        "\nNext sign-in needs a fresh challenge (nonce {})",
        replay.nonce
    );
    Ok(())
}
