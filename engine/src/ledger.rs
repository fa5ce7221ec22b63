//! The ledger: account state, the pending pool and the sealed chain.
//!
//! `Ledger` is the "blockchain" instance behind a bridge handle. Accepted
//! transactions are applied to account state immediately and collect in the
//! pending pool until `create_block` seals them.

use std::collections::BTreeMap;

use chainbridge_primitives::{
    merkle::ordered_root,
    state::commit_writes,
    Account, AccountOverlay, Block, BlockHeight, CoreError, CoreResult, Hash, MerkleTree,
    Transaction, GENESIS_HASH,
};
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::transaction::process_transaction;
use crate::validation::validate_address;

/// In-memory deterministic ledger.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    config: LedgerConfig,
    accounts: BTreeMap<String, Account>,
    pending: Vec<Transaction>,
    chain: Vec<Block>,
}

impl Ledger {
    /// Create an empty ledger at height 0.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ── Accounts ──

    /// Create `address` with `balance`, or reset the balance of an existing
    /// account. The nonce of an existing account is kept.
    pub fn init_account(&mut self, address: &str, balance: u64) -> CoreResult<()> {
        validate_address(address, "account")?;
        let account = self.accounts.entry(address.to_owned()).or_default();
        account.balance = balance;
        debug!(address, balance, nonce = account.nonce, "account initialised");
        Ok(())
    }

    /// Balance of `address`, or 0 if the account does not exist.
    pub fn get_balance(&self, address: &str) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.balance)
    }

    /// Nonce of `address`, or 0 if the account does not exist.
    pub fn get_nonce(&self, address: &str) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.nonce)
    }

    pub fn account(&self, address: &str) -> Option<Account> {
        self.accounts.get(address).copied()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Sum of every balance. `u128` so it cannot overflow.
    pub fn total_supply(&self) -> u128 {
        self.accounts.values().map(|a| u128::from(a.balance)).sum()
    }

    /// Merkle root over `(address, balance_le || nonce_le)` in address order.
    pub fn state_root(&self) -> Hash {
        let mut tree = MerkleTree::new();
        for (address, account) in &self.accounts {
            tree.insert(address.as_bytes(), &account.leaf_value());
        }
        tree.root()
    }

    // ── Transactions ──

    /// Validate and apply `tx`, then add it to the pending pool.
    ///
    /// On any failure the ledger is unchanged and the error is a
    /// `TransactionError`.
    pub fn apply_transaction(&mut self, tx: Transaction) -> CoreResult<()> {
        let writes = {
            let mut overlay = AccountOverlay::new(&self.accounts);
            if let Err(err) = process_transaction(&tx, &mut overlay) {
                warn!(from = %tx.from, to = %tx.to, nonce = tx.nonce, error = %err, "transaction rejected");
                return Err(err);
            }
            overlay.into_writes()
        };
        commit_writes(&mut self.accounts, writes);

        debug!(
            from = %tx.from,
            to = %tx.to,
            amount = tx.amount,
            fee = tx.gas_fee,
            nonce = tx.nonce,
            "transaction accepted"
        );
        self.pending.push(tx);
        Ok(())
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // ── Blocks ──

    /// Seal the pending pool into a new block proposed by `validator`.
    ///
    /// Fails with `InvalidParameter` for an empty validator address and with
    /// `BlockchainError` for an empty pool when empty blocks are disallowed.
    /// The ledger is unchanged on failure.
    pub fn create_block(&mut self, validator: &str) -> CoreResult<&Block> {
        validate_address(validator, "validator")?;
        if self.pending.is_empty() && !self.config.allow_empty_blocks {
            return Err(CoreError::Blockchain(
                "no pending transactions and empty blocks are disallowed".into(),
            ));
        }

        let tx_hashes = self
            .pending
            .iter()
            .map(Transaction::hash)
            .collect::<CoreResult<Vec<Hash>>>()?;
        let height = self.height() + 1;
        let prev_hash = self.latest_hash();
        let hash = Block::compute_hash(&prev_hash, height, validator, &tx_hashes)?;

        let block = Block {
            height,
            prev_hash,
            hash,
            proposer: validator.to_owned(),
            state_root: self.state_root(),
            tx_root: ordered_root(&tx_hashes),
            transactions: std::mem::take(&mut self.pending),
        };
        info!(
            height,
            proposer = validator,
            txs = block.tx_count(),
            "block created"
        );
        self.chain.push(block);

        self.chain
            .last()
            .ok_or_else(|| CoreError::Internal("chain empty after append".into()))
    }

    /// Number of sealed blocks.
    pub fn height(&self) -> BlockHeight {
        self.chain.len() as BlockHeight
    }

    /// Hash of the last sealed block, or `GENESIS_HASH` before the first.
    pub fn latest_hash(&self) -> Hash {
        self.chain.last().map_or(GENESIS_HASH, |b| b.hash)
    }

    /// Sealed block at `height` (1-based).
    pub fn block(&self, height: BlockHeight) -> Option<&Block> {
        let idx = usize::try_from(height.checked_sub(1)?).ok()?;
        self.chain.get(idx)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(from: &str, to: &str, amount: u64, nonce: u64) -> Transaction {
        Transaction {
            from: from.into(),
            to: to.into(),
            amount,
            gas_fee: 1,
            timestamp: 1_700_000_000,
            nonce,
            signature: b"s".to_vec(),
        }
    }

    fn funded() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.init_account("alice", 1000).unwrap();
        ledger.init_account("bob", 0).unwrap();
        ledger
    }

    #[test]
    fn test_new_ledger() {
        let ledger = Ledger::default();
        assert_eq!(ledger.height(), 0);
        assert_eq!(ledger.latest_hash(), GENESIS_HASH);
        assert_eq!(ledger.get_balance("nobody"), 0);
        assert_eq!(ledger.state_root(), chainbridge_primitives::ZERO_HASH);
        assert!(ledger.block(0).is_none());
        assert!(ledger.block(1).is_none());
    }

    #[test]
    fn test_init_account_keeps_nonce() {
        let mut ledger = funded();
        ledger.apply_transaction(transfer("alice", "bob", 10, 0)).unwrap();
        ledger.init_account("alice", 5).unwrap();
        assert_eq!(ledger.get_balance("alice"), 5);
        assert_eq!(ledger.get_nonce("alice"), 1);
    }

    #[test]
    fn test_init_account_empty_address() {
        let mut ledger = Ledger::default();
        let err = ledger.init_account("", 1).unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameter(_)));
        assert_eq!(ledger.account_count(), 0);
    }

    #[test]
    fn test_rejected_tx_leaves_state_unchanged() {
        let mut ledger = funded();
        let root = ledger.state_root();
        assert!(ledger.apply_transaction(transfer("alice", "bob", 5000, 0)).is_err());
        assert!(ledger.apply_transaction(transfer("alice", "bob", 10, 7)).is_err());
        assert_eq!(ledger.state_root(), root);
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn test_fee_is_burned() {
        let mut ledger = funded();
        let before = ledger.total_supply();
        ledger.apply_transaction(transfer("alice", "bob", 100, 0)).unwrap();
        assert_eq!(ledger.total_supply(), before - 1);
    }

    #[test]
    fn test_create_block_links_chain() {
        let mut ledger = funded();
        ledger.apply_transaction(transfer("alice", "bob", 100, 0)).unwrap();
        let first = ledger.create_block("v1").unwrap().clone();
        assert_eq!(first.height, 1);
        assert_eq!(first.prev_hash, GENESIS_HASH);
        assert_eq!(first.tx_count(), 1);
        assert_eq!(first.state_root, ledger.state_root());

        ledger.apply_transaction(transfer("alice", "bob", 100, 1)).unwrap();
        let second = ledger.create_block("v2").unwrap().clone();
        assert_eq!(second.height, 2);
        assert_eq!(second.prev_hash, first.hash);
        assert_eq!(ledger.latest_hash(), second.hash);
        assert_eq!(ledger.block(1), Some(&first));
    }

    #[test]
    fn test_empty_block_disallowed_by_default() {
        let mut ledger = funded();
        for _ in 0..3 {
            let err = ledger.create_block("v1").unwrap_err();
            assert!(matches!(err, CoreError::Blockchain(_)));
        }
        assert_eq!(ledger.height(), 0);
    }

    #[test]
    fn test_empty_block_allowed_by_config() {
        let mut ledger = Ledger::new(LedgerConfig {
            allow_empty_blocks: true,
            ..LedgerConfig::default()
        });
        let block = ledger.create_block("v1").unwrap();
        assert!(block.is_empty());
        assert_eq!(block.tx_root, chainbridge_primitives::ZERO_HASH);
        assert_eq!(ledger.height(), 1);
    }

    #[test]
    fn test_create_block_empty_validator() {
        let mut ledger = funded();
        ledger.apply_transaction(transfer("alice", "bob", 1, 0)).unwrap();
        let err = ledger.create_block("").unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameter(_)));
        assert_eq!(ledger.pending_count(), 1);
    }
}
