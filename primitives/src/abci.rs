//! Request/response types for the opaque `process` exchange.
//!
//! The host consensus runtime sends one `AbciRequest` per call and receives
//! one `AbciResponse`. Both are carried as bytes in the encoding defined in
//! [`crate::codec`].

use serde::{Deserialize, Serialize};

use crate::types::{BlockHeight, Hash};

/// `DeliverTx` / `Query` code: accepted.
pub const CODE_OK: u32 = 0;
/// `DeliverTx`: rejected by the ledger. `Query`: unknown path.
pub const CODE_REJECTED: u32 = 1;
/// `DeliverTx`: transaction bytes could not be decoded.
pub const CODE_BAD_ENCODING: u32 = 2;

/// Account seeded by `InitChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub address: String,
    pub balance: u64,
}

/// A request from the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbciRequest {
    /// Report height and hashes.
    Info,
    /// Seed genesis accounts. Validators are validated, not stored.
    InitChain {
        validators: Vec<String>,
        genesis_accounts: Vec<GenesisAccount>,
    },
    /// Open block `height` proposed by `proposer`.
    BeginBlock { height: BlockHeight, proposer: String },
    /// Submit one encoded transaction to the open block.
    DeliverTx { tx: Vec<u8> },
    /// Close the open block.
    EndBlock { height: BlockHeight },
    /// Seal the pending transactions into a block.
    Commit,
    /// Read-only state query.
    Query { path: String, data: Vec<u8> },
}

impl AbciRequest {
    /// Wire tag of this request.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Info => 0x01,
            Self::InitChain { .. } => 0x02,
            Self::BeginBlock { .. } => 0x03,
            Self::DeliverTx { .. } => 0x04,
            Self::EndBlock { .. } => 0x05,
            Self::Commit => 0x06,
            Self::Query { .. } => 0x07,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::InitChain { .. } => "init_chain",
            Self::BeginBlock { .. } => "begin_block",
            Self::DeliverTx { .. } => "deliver_tx",
            Self::EndBlock { .. } => "end_block",
            Self::Commit => "commit",
            Self::Query { .. } => "query",
        }
    }
}

/// A response to the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbciResponse {
    Info {
        height: BlockHeight,
        latest_hash: Hash,
        app_hash: Hash,
    },
    InitChain,
    BeginBlock,
    DeliverTx { code: u32, log: String },
    EndBlock { validator_updates: Vec<String> },
    Commit { height: BlockHeight, app_hash: Hash },
    Query { code: u32, value: Vec<u8>, log: String },
}

impl AbciResponse {
    /// Wire tag of this response. Matches the tag of the request it answers.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Info { .. } => 0x01,
            Self::InitChain => 0x02,
            Self::BeginBlock => 0x03,
            Self::DeliverTx { .. } => 0x04,
            Self::EndBlock { .. } => 0x05,
            Self::Commit { .. } => 0x06,
            Self::Query { .. } => 0x07,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_response_tags_align() {
        let pairs = [
            (AbciRequest::Info.tag(), AbciResponse::Info { height: 0, latest_hash: [0; 32], app_hash: [0; 32] }.tag()),
            (AbciRequest::Commit.tag(), AbciResponse::Commit { height: 1, app_hash: [0; 32] }.tag()),
            (
                AbciRequest::DeliverTx { tx: vec![] }.tag(),
                AbciResponse::DeliverTx { code: 0, log: String::new() }.tag(),
            ),
        ];
        for (req, resp) in pairs {
            assert_eq!(req, resp);
        }
    }
}
