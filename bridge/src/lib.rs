//! `chainbridge`: C ABI over the chainbridge ledger and consensus engine.
//!
//! Builds as a `cdylib` for the host runtime and as an `rlib` for Rust
//! callers and tests. The C declarations live in `include/chainbridge.h`.
//!
//! Instances are owned by a process-wide [`registry::HandleRegistry`] and
//! addressed by opaque `u64` handles. Every allocation handed to the caller
//! (strings, byte buffers, error messages) has exactly one release function:
//!
//! - `chainbridge_free_string`
//! - `chainbridge_free_bytes`
//! - `chainbridge_free_error`
//!
//! Releasing twice is a caller contract violation and is not detected.

pub mod config;
pub mod error;
pub mod exports;
pub mod logging;
pub mod registry;
pub mod state;
pub mod types;

pub use config::{BridgeConfig, ConfigError};
pub use error::{chainbridge_free_error, BridgeError};
pub use exports::abci::chainbridge_abci_process;
pub use exports::blockchain::{
    chainbridge_blockchain_add_transaction, chainbridge_blockchain_create_block,
    chainbridge_blockchain_destroy, chainbridge_blockchain_get_balance,
    chainbridge_blockchain_get_nonce, chainbridge_blockchain_height,
    chainbridge_blockchain_init_account, chainbridge_blockchain_latest_hash,
    chainbridge_blockchain_new,
};
pub use exports::consensus::{
    chainbridge_consensus_add_validator, chainbridge_consensus_destroy,
    chainbridge_consensus_new, chainbridge_consensus_remove_validator,
    chainbridge_consensus_select_proposer, chainbridge_consensus_select_proposer_for_height,
};
pub use exports::lifecycle::{chainbridge_init, chainbridge_shutdown};
pub use registry::Handle;
pub use types::{chainbridge_free_bytes, chainbridge_free_string, CByteArray, CTransaction};
