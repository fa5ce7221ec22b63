//! Account state and the transactional account overlay.
//!
//! The overlay buffers account writes while a transaction is being
//! validated and applied. Reads see buffered writes first, then fall
//! through to committed state. On success the writes are committed in one
//! step; on failure the overlay is dropped and committed state is untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Balance and replay-protection nonce of one address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: u64,
    pub nonce: u64,
}

impl Account {
    /// Create an account with the given balance and a zero nonce.
    pub fn with_balance(balance: u64) -> Self {
        Self { balance, nonce: 0 }
    }

    /// Canonical Merkle leaf value: `balance_le || nonce_le`.
    pub fn leaf_value(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.balance.to_le_bytes());
        out[8..].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }
}

/// Write buffer over a committed account map.
///
/// Uses `BTreeMap` so `commit` applies writes in address order.
#[derive(Debug)]
pub struct AccountOverlay<'a> {
    committed: &'a BTreeMap<String, Account>,
    writes: BTreeMap<String, Account>,
}

impl<'a> AccountOverlay<'a> {
    /// Create an empty overlay over `committed`.
    pub fn new(committed: &'a BTreeMap<String, Account>) -> Self {
        Self {
            committed,
            writes: BTreeMap::new(),
        }
    }

    /// Look up an account, preferring buffered writes.
    pub fn get(&self, address: &str) -> Option<Account> {
        self.writes
            .get(address)
            .or_else(|| self.committed.get(address))
            .copied()
    }

    /// Buffer a write for `address`, replacing any earlier buffered write.
    pub fn set(&mut self, address: &str, account: Account) {
        self.writes.insert(address.to_owned(), account);
    }

    /// Returns the number of addresses touched in this overlay.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns true if no writes have been buffered.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Consume the overlay and return the buffered writes, sorted by address.
    pub fn into_writes(self) -> BTreeMap<String, Account> {
        self.writes
    }
}

/// Apply buffered writes to the committed map.
pub fn commit_writes(committed: &mut BTreeMap<String, Account>, writes: BTreeMap<String, Account>) {
    for (address, account) in writes {
        committed.insert(address, account);
    }
}
