//! `chainbridge-primitives`: foundational types for the chainbridge ledger.
//!
//! This crate provides the canonical types, error codes, hashing, Merkle
//! root, account overlay, validator record and deterministic serialization
//! shared by the ledger/consensus engine and the exported C bridge.

pub mod types;
pub mod error;
pub mod crypto;
pub mod block;
pub mod state;
pub mod validator;
pub mod merkle;
pub mod abci;
pub mod codec;

// Re-export commonly used types at the crate root for convenience.
pub use types::{Hash, BlockHeight, GENESIS_HASH, ZERO_HASH};
pub use error::{CoreError, CoreResult, ErrorCode};
pub use block::{Block, Transaction};
pub use state::{Account, AccountOverlay};
pub use validator::Validator;
pub use merkle::MerkleTree;
pub use abci::{AbciRequest, AbciResponse, GenesisAccount};
