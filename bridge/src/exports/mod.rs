//! Exported `extern "C"` entry points.
//!
//! Conventions shared by every function here:
//! - Entry points other than init, shutdown and the free functions fail
//!   with `StateError` while the bridge is not initialised.
//! - Fallible calls report through a `BridgeError`, returned directly or
//!   written through the trailing `err` out pointer when it is non-null.
//!   On failure the primary result is 0, false or null.
//! - No call unwinds into the caller: a panic becomes `InternalError`.

pub mod abci;
pub mod blockchain;
pub mod consensus;
pub mod lifecycle;

use chainbridge_engine::ConsensusEngine;
use chainbridge_primitives::CoreResult;

use crate::registry::{BlockchainInstance, Handle};
use crate::state::bridge;

/// Run `f` with the blockchain instance behind `handle` locked.
fn with_blockchain<T>(
    handle: Handle,
    f: impl FnOnce(&mut BlockchainInstance) -> CoreResult<T>,
) -> CoreResult<T> {
    let instance = bridge().registry()?.blockchain(handle)?;
    let mut guard = instance.lock();
    f(&mut guard)
}

/// Run `f` with the consensus engine behind `handle` locked.
fn with_consensus<T>(
    handle: Handle,
    f: impl FnOnce(&mut ConsensusEngine) -> CoreResult<T>,
) -> CoreResult<T> {
    let engine = bridge().registry()?.consensus(handle)?;
    let mut guard = engine.lock();
    f(&mut guard)
}
