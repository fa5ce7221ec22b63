//! Validator record held by the consensus engine.

use serde::{Deserialize, Serialize};

/// A staked validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: String,
    /// Selection weight. Always non-zero once the validator is in a set.
    pub stake: u64,
    /// Number of times this validator was chosen by the engine's round counter.
    #[serde(default)]
    pub blocks_proposed: u64,
}

impl Validator {
    pub fn new(address: impl Into<String>, stake: u64) -> Self {
        Self {
            address: address.into(),
            stake,
            blocks_proposed: 0,
        }
    }
}
