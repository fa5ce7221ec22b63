//! Ledger and consensus policy.

use serde::{Deserialize, Serialize};

/// Policy applied to every ledger and consensus instance.
///
/// Must be identical on every node; it feeds directly into which blocks are
/// accepted and which validators may join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Whether `create_block` may seal a block with no transactions.
    /// Default: false.
    pub allow_empty_blocks: bool,

    /// Smallest stake `add_validator` accepts. Default: 1.
    pub min_validator_stake: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            allow_empty_blocks: false,
            min_validator_stake: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert!(!config.allow_empty_blocks);
        assert_eq!(config.min_validator_stake, 1);
    }
}
