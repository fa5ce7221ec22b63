//! Block and transaction types.
//!
//! A `Transaction` is a value transfer between two string addresses. A
//! `Block` seals an ordered list of accepted transactions on top of the
//! previous block's hash.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::crypto::hash_sha256;
use crate::error::CoreResult;
use crate::types::{BlockHeight, Hash};

/// A value transfer. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Amount credited to the recipient.
    pub amount: u64,
    /// Fee debited from the sender and burned.
    pub gas_fee: u64,
    /// Caller-supplied logical timestamp. Never read from the OS clock.
    pub timestamp: u64,
    /// Must equal the sender's current nonce.
    pub nonce: u64,
    /// Opaque signature bytes, carried but not interpreted.
    #[serde(default)]
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Total debit from the sender, or `None` on overflow.
    pub fn total_cost(&self) -> Option<u64> {
        self.amount.checked_add(self.gas_fee)
    }

    /// SHA-256 over the canonical encoding of every field.
    pub fn hash(&self) -> CoreResult<Hash> {
        Ok(hash_sha256(&codec::encode_transaction(self)?))
    }
}

/// A sealed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub height: BlockHeight,
    /// Hash of the previous block, or `GENESIS_HASH` for the first block.
    pub prev_hash: Hash,
    /// Hash of this block (see [`Block::compute_hash`]).
    pub hash: Hash,
    /// Address of the validator that proposed the block.
    pub proposer: String,
    /// Merkle root of the account state after this block.
    pub state_root: Hash,
    /// Merkle root of the transaction hashes.
    pub tx_root: Hash,
    /// Ordered transactions included in this block.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Block hash: SHA-256 of `prev_hash || height || proposer || tx_count || tx_hash*`.
    ///
    /// Timestamps and the state root are not part of the preimage.
    pub fn compute_hash(
        prev_hash: &Hash,
        height: BlockHeight,
        proposer: &str,
        tx_hashes: &[Hash],
    ) -> CoreResult<Hash> {
        let preimage = codec::encode_block_preimage(prev_hash, height, proposer, tx_hashes)?;
        Ok(hash_sha256(&preimage))
    }

    /// Returns the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Returns true if this block has no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
