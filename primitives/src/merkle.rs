//! Merkle roots for account state and transaction lists.
//!
//! Leaves are hashed with a domain prefix and combined pairwise, level by
//! level, into a binary tree. An odd node at the end of a level is promoted
//! unchanged. The empty tree has the zero hash as its root.

use std::collections::BTreeMap;

use crate::crypto::hash_blake3;
use crate::types::{Hash, ZERO_HASH};

/// Domain separator for leaf nodes.
const LEAF_PREFIX: u8 = 0x00;
/// Domain separator for internal nodes.
const INTERNAL_PREFIX: u8 = 0x01;

/// Key-value Merkle tree with insertion-order-independent root.
#[derive(Debug, Clone, Default)]
pub struct MerkleTree {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MerkleTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a key-value pair.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) {
        self.entries.insert(key.to_vec(), value.to_vec());
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compute the root over all entries in key order.
    pub fn root(&self) -> Hash {
        let leaves: Vec<Hash> = self
            .entries
            .iter()
            .map(|(k, v)| hash_leaf(k, v))
            .collect();
        root_from_leaves(&leaves)
    }
}

/// Root of an ordered list of already-hashed items (e.g. transaction hashes).
pub fn ordered_root(items: &[Hash]) -> Hash {
    let leaves: Vec<Hash> = items.iter().map(|item| hash_leaf(&[], item)).collect();
    root_from_leaves(&leaves)
}

/// Hash a leaf node: H(LEAF_PREFIX || key_len_le32 || key || value)
fn hash_leaf(key: &[u8], value: &[u8]) -> Hash {
    let key_len = (key.len() as u32).to_le_bytes();
    let mut data = Vec::with_capacity(1 + 4 + key.len() + value.len());
    data.push(LEAF_PREFIX);
    data.extend_from_slice(&key_len);
    data.extend_from_slice(key);
    data.extend_from_slice(value);
    hash_blake3(&data)
}

/// Hash an internal node: H(INTERNAL_PREFIX || left || right)
fn hash_internal(left: &Hash, right: &Hash) -> Hash {
    let mut data = [0u8; 1 + 32 + 32];
    data[0] = INTERNAL_PREFIX;
    data[1..33].copy_from_slice(left);
    data[33..65].copy_from_slice(right);
    hash_blake3(&data)
}

fn root_from_leaves(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return ZERO_HASH;
    }

    let mut level: Vec<Hash> = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_internal(left, right),
                [odd] => *odd,
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
    }
    level[0]
}
