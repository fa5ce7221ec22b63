//! Shared test helpers for engine integration tests.
//!
//! Provides stable account names, transfer construction and pre-funded
//! ledgers used across the integration test files.

#![allow(dead_code)]

use chainbridge_engine::{Ledger, LedgerConfig};
use chainbridge_primitives::Transaction;

/// Fixed logical timestamp. Nothing in the engine reads the OS clock.
pub const T0: u64 = 1_700_000_000;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";
pub const CHARLIE: &str = "charlie";

// ── Transactions ──

/// Transfer with fee 1 and a fixed opaque signature.
pub fn transfer(from: &str, to: &str, amount: u64, nonce: u64) -> Transaction {
    transfer_with_fee(from, to, amount, 1, nonce)
}

pub fn transfer_with_fee(from: &str, to: &str, amount: u64, gas_fee: u64, nonce: u64) -> Transaction {
    Transaction {
        from: from.into(),
        to: to.into(),
        amount,
        gas_fee,
        timestamp: T0 + nonce,
        nonce,
        signature: b"s".to_vec(),
    }
}

// ── Ledgers ──

/// Ledger with the given `(address, balance)` accounts.
pub fn funded_ledger(accounts: &[(&str, u64)]) -> Ledger {
    let mut ledger = Ledger::new(LedgerConfig::default());
    for (address, balance) in accounts {
        ledger.init_account(address, *balance).unwrap();
    }
    ledger
}

/// alice=1000, bob=0.
pub fn alice_and_bob() -> Ledger {
    funded_ledger(&[(ALICE, 1000), (BOB, 0)])
}

/// Drive `ledger` through a fixed workload of three blocks.
pub fn run_workload(ledger: &mut Ledger) {
    ledger.apply_transaction(transfer(ALICE, BOB, 100, 0)).unwrap();
    ledger.apply_transaction(transfer(ALICE, CHARLIE, 50, 1)).unwrap();
    ledger.create_block("v1").unwrap();

    ledger.apply_transaction(transfer(BOB, CHARLIE, 25, 0)).unwrap();
    // Rejected: stale nonce.
    assert!(ledger.apply_transaction(transfer(ALICE, BOB, 1, 0)).is_err());
    ledger.create_block("v2").unwrap();

    ledger.apply_transaction(transfer_with_fee(CHARLIE, ALICE, 70, 4, 0)).unwrap();
    ledger.create_block("v1").unwrap();
}
