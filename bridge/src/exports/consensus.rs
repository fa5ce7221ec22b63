//! Consensus engine entry points.

use std::ffi::c_char;
use std::ptr;

use super::with_consensus;
use crate::error::{guard, guard_status, BridgeError};
use crate::registry::Handle;
use crate::state::bridge;
use crate::types::{borrow_str, into_c_string};

/// Create an empty validator set and return its handle.
///
/// # Safety
/// `err` must be null or valid for writes of one `BridgeError`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_consensus_new(err: *mut BridgeError) -> Handle {
    guard("chainbridge_consensus_new", err, 0, || {
        bridge().insert_consensus()
    })
}

/// Destroy a consensus engine. Destroying twice fails with `InvalidParameter`.
#[no_mangle]
pub extern "C" fn chainbridge_consensus_destroy(handle: Handle) -> BridgeError {
    guard_status("chainbridge_consensus_destroy", || {
        bridge().registry()?.remove_consensus(handle)
    })
}

/// Add `address` with `stake`, or replace its stake.
///
/// Empty address, zero stake or stake below the configured minimum fail
/// with `InvalidParameter`.
///
/// # Safety
/// - `address` must be null or a NUL-terminated string
/// - `err` must be null or valid for writes of one `BridgeError`
#[no_mangle]
pub unsafe extern "C" fn chainbridge_consensus_add_validator(
    handle: Handle,
    address: *const c_char,
    stake: u64,
    err: *mut BridgeError,
) -> bool {
    guard("chainbridge_consensus_add_validator", err, false, || {
        with_consensus(handle, |c| {
            let address = borrow_str(address, "address")?;
            c.add_validator(address, stake)
        })?;
        Ok(true)
    })
}

/// Remove `address`. An unknown validator fails with `ConsensusError`.
///
/// # Safety
/// Same as `chainbridge_consensus_add_validator`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_consensus_remove_validator(
    handle: Handle,
    address: *const c_char,
    err: *mut BridgeError,
) -> bool {
    guard("chainbridge_consensus_remove_validator", err, false, || {
        with_consensus(handle, |c| {
            let address = borrow_str(address, "address")?;
            c.remove_validator(address)
        })?;
        Ok(true)
    })
}

/// Select the proposer for the engine's current round and advance the round.
///
/// # Returns
/// The winner's address, to release with `chainbridge_free_string`, or
/// null on error. An empty set fails with `ConsensusError`.
///
/// # Safety
/// `err` must be null or valid for writes of one `BridgeError`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_consensus_select_proposer(
    handle: Handle,
    err: *mut BridgeError,
) -> *mut c_char {
    guard("chainbridge_consensus_select_proposer", err, ptr::null_mut(), || {
        let winner = with_consensus(handle, |c| c.next_proposer())?;
        into_c_string(winner)
    })
}

/// Select the proposer for `height` without changing any state.
///
/// # Safety
/// `err` must be null or valid for writes of one `BridgeError`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_consensus_select_proposer_for_height(
    handle: Handle,
    height: u64,
    err: *mut BridgeError,
) -> *mut c_char {
    guard(
        "chainbridge_consensus_select_proposer_for_height",
        err,
        ptr::null_mut(),
        || {
            let winner = with_consensus(handle, |c| c.select_proposer_for_height(height))?;
            into_c_string(winner)
        },
    )
}
