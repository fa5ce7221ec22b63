//! Transfer processing against an account overlay.
//!
//! A transfer debits `amount + gas_fee` from the sender, credits `amount`
//! to the recipient and bumps the sender's nonce. The fee is burned: it is
//! credited to nobody. All reads and writes go through an
//! [`AccountOverlay`], so a failed transfer leaves committed state
//! untouched.

use chainbridge_primitives::{Account, AccountOverlay, CoreError, CoreResult, Transaction};

use crate::validation::validate_transaction_fields;

/// Apply one transaction to the overlay.
///
/// Steps:
/// 1. Structural checks (addresses, amount)
/// 2. Sender must exist
/// 3. Nonce must equal the sender's current nonce
/// 4. Sender must cover `amount + gas_fee`
/// 5. Debit sender and increment its nonce
/// 6. Credit recipient, creating it if needed
///
/// The recipient is read after the sender write, so a self-transfer sees
/// its own debit and ends up paying only the fee.
pub fn process_transaction(tx: &Transaction, overlay: &mut AccountOverlay<'_>) -> CoreResult<()> {
    validate_transaction_fields(tx)?;

    let sender = overlay
        .get(&tx.from)
        .ok_or_else(|| CoreError::Transaction(format!("unknown sender: {}", tx.from)))?;

    if tx.nonce != sender.nonce {
        return Err(CoreError::Transaction(format!(
            "nonce mismatch: expected {}, got {}",
            sender.nonce, tx.nonce
        )));
    }

    let total = tx
        .total_cost()
        .ok_or_else(|| CoreError::Transaction("amount + gas_fee overflows".into()))?;
    if sender.balance < total {
        return Err(CoreError::Transaction(format!(
            "insufficient balance: have {}, need {}",
            sender.balance, total
        )));
    }

    let next_nonce = sender
        .nonce
        .checked_add(1)
        .ok_or_else(|| CoreError::Transaction("sender nonce overflows".into()))?;
    overlay.set(
        &tx.from,
        Account {
            balance: sender.balance - total,
            nonce: next_nonce,
        },
    );

    let recipient = overlay.get(&tx.to).unwrap_or_default();
    let credited = recipient
        .balance
        .checked_add(tx.amount)
        .ok_or_else(|| CoreError::Transaction("recipient balance overflow".into()))?;
    overlay.set(
        &tx.to,
        Account {
            balance: credited,
            nonce: recipient.nonce,
        },
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn state() -> BTreeMap<String, Account> {
        let mut map = BTreeMap::new();
        map.insert("alice".to_string(), Account::with_balance(1000));
        map
    }

    fn transfer(from: &str, to: &str, amount: u64, fee: u64, nonce: u64) -> Transaction {
        Transaction {
            from: from.into(),
            to: to.into(),
            amount,
            gas_fee: fee,
            timestamp: 1,
            nonce,
            signature: Vec::new(),
        }
    }

    #[test]
    fn test_transfer_debits_credits_and_burns_fee() {
        let base = state();
        let mut overlay = AccountOverlay::new(&base);
        process_transaction(&transfer("alice", "bob", 100, 1, 0), &mut overlay).unwrap();

        assert_eq!(overlay.get("alice"), Some(Account { balance: 899, nonce: 1 }));
        assert_eq!(overlay.get("bob"), Some(Account { balance: 100, nonce: 0 }));
    }

    #[test]
    fn test_self_transfer_costs_fee_only() {
        let base = state();
        let mut overlay = AccountOverlay::new(&base);
        process_transaction(&transfer("alice", "alice", 500, 3, 0), &mut overlay).unwrap();
        assert_eq!(overlay.get("alice"), Some(Account { balance: 997, nonce: 1 }));
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_unknown_sender() {
        let base = state();
        let mut overlay = AccountOverlay::new(&base);
        let err = process_transaction(&transfer("carol", "bob", 1, 0, 0), &mut overlay).unwrap_err();
        assert!(err.to_string().contains("unknown sender"));
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_nonce_mismatch() {
        let base = state();
        let mut overlay = AccountOverlay::new(&base);
        let err = process_transaction(&transfer("alice", "bob", 1, 0, 1), &mut overlay).unwrap_err();
        assert!(matches!(err, CoreError::Transaction(_)));
        assert!(err.to_string().contains("expected 0, got 1"));
    }

    #[test]
    fn test_fee_counts_toward_balance() {
        let base = state();
        let mut overlay = AccountOverlay::new(&base);
        assert!(process_transaction(&transfer("alice", "bob", 1000, 1, 0), &mut overlay).is_err());

        let mut overlay = AccountOverlay::new(&base);
        assert!(process_transaction(&transfer("alice", "bob", 999, 1, 0), &mut overlay).is_ok());
        assert_eq!(overlay.get("alice").unwrap().balance, 0);
    }

    #[test]
    fn test_cost_overflow() {
        let base = state();
        let mut overlay = AccountOverlay::new(&base);
        let err = process_transaction(&transfer("alice", "bob", u64::MAX, 1, 0), &mut overlay)
            .unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_recipient_overflow() {
        let mut base = state();
        base.insert("whale".to_string(), Account::with_balance(u64::MAX));
        let mut overlay = AccountOverlay::new(&base);
        let err = process_transaction(&transfer("alice", "whale", 1, 0, 0), &mut overlay).unwrap_err();
        assert!(err.to_string().contains("recipient balance overflow"));
    }
}
