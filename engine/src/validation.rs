//! Stateless checks run before a transaction or genesis batch touches state.
//!
//! These functions look only at their arguments. Checks that need the
//! current account map (sender existence, nonce, balance) live in
//! [`crate::transaction`].

use chainbridge_primitives::{CoreError, CoreResult, GenesisAccount, Transaction};

/// Validate an address argument.
///
/// Returns `InvalidParameter` naming `what` if the address is empty.
pub fn validate_address(address: &str, what: &str) -> CoreResult<()> {
    if address.is_empty() {
        return Err(CoreError::InvalidParameter(format!(
            "{} address must be non-empty",
            what
        )));
    }
    Ok(())
}

/// Validate the structural fields of a transaction.
///
/// Checks, in order:
/// 1. `from` and `to` are non-empty
/// 2. `amount > 0`
///
/// Failures are `TransactionError`, since they reject a submitted transfer.
pub fn validate_transaction_fields(tx: &Transaction) -> CoreResult<()> {
    if tx.from.is_empty() {
        return Err(CoreError::Transaction("sender address is empty".into()));
    }
    if tx.to.is_empty() {
        return Err(CoreError::Transaction("recipient address is empty".into()));
    }
    if tx.amount == 0 {
        return Err(CoreError::Transaction("amount must be > 0".into()));
    }
    Ok(())
}

/// Validate every genesis account before any of them is applied.
pub fn validate_genesis_accounts(accounts: &[GenesisAccount]) -> CoreResult<()> {
    for (idx, account) in accounts.iter().enumerate() {
        if account.address.is_empty() {
            return Err(CoreError::InvalidParameter(format!(
                "genesis account {} has an empty address",
                idx
            )));
        }
    }
    Ok(())
}
