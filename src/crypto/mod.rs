pub mod address;
pub mod c32;
pub mod challenge;
pub mod hash;
pub mod jwt;
pub mod signature;

// Re-export main functions for easier access
pub use address::derive_address;
pub use signature::{parse_signature, recover_and_match};
