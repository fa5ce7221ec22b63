//! `chainbridge-engine`: deterministic ledger and consensus state machines.
//!
//! Everything in this crate is a pure function of the calls made on it:
//! no clock, no randomness, no I/O. Two instances fed the same sequence of
//! calls reach identical account maps, state roots, block hashes and
//! proposer choices.
//!
//! ## Architecture
//!
//! - [`validation`]: stateless transaction and genesis checks
//! - [`transaction`]: applies one transfer to an account overlay
//! - [`ledger::Ledger`]: accounts, pending pool, chain and block builder
//! - [`consensus`]: stake-weighted validator set and proposer selection
//! - [`abci`]: request dispatcher for the opaque `process` exchange
//! - [`config::LedgerConfig`]: per-instance policy

pub mod config;
pub mod validation;
pub mod transaction;
pub mod ledger;
pub mod consensus;
pub mod abci;

// Re-export key types for convenience
pub use abci::BlockSession;
pub use config::LedgerConfig;
pub use consensus::{ConsensusEngine, ValidatorSet};
pub use ledger::Ledger;
