//! Account collaborator seam.
//!
//! The core never owns account storage; it asks a collaborator to look up
//! or create the account behind a verified wallet address. The bundled
//! in-memory implementation is suitable for tests and demos.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// The account descriptor exchanged with collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub wallet_address: String,
    pub username: String,
}

/// Look up or create the account bound to a wallet address.
pub trait AccountStore: Send + Sync {
    /// Returns the account and whether it was created by this call.
    fn get_or_create(&self, wallet_address: &str) -> Result<(Account, bool)>;
}

/// Map-backed account store keyed by wallet address.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usernames are derived from the first characters of the address,
    /// suffixed with a counter when two addresses share them.
    fn generate_username(accounts: &HashMap<String, Account>, wallet_address: &str) -> String {
        let base: String = wallet_address.chars().take(8).collect();
        let base = format!("user_{base}");
        let mut candidate = base.clone();
        let mut counter = 1;
        while accounts.values().any(|a| a.username == candidate) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        candidate
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get_or_create(&self, wallet_address: &str) -> Result<(Account, bool)> {
        let mut accounts = self.accounts.lock();
        if let Some(existing) = accounts.get(wallet_address) {
            return Ok((existing.clone(), false));
        }
        let account = Account {
            id: Uuid::new_v4(),
            wallet_address: wallet_address.to_owned(),
            username: Self::generate_username(&accounts, wallet_address),
        };
        accounts.insert(wallet_address.to_owned(), account.clone());
        Ok((account, true))
    }
}
