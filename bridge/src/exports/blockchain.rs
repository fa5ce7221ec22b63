//! Ledger entry points.

use std::ffi::c_char;
use std::ptr;

use chainbridge_primitives::types::hash_to_hex;

use super::with_blockchain;
use crate::error::{guard, guard_status, BridgeError};
use crate::registry::Handle;
use crate::state::bridge;
use crate::types::{borrow_str, into_c_string, CTransaction};

/// Create a ledger and return its handle.
///
/// The ledger uses the configured block policy and starts with the
/// configured genesis accounts.
///
/// # Returns
/// A non-zero handle, or 0 on error.
///
/// # Safety
/// `err` must be null or valid for writes of one `BridgeError`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_blockchain_new(err: *mut BridgeError) -> Handle {
    guard("chainbridge_blockchain_new", err, 0, || {
        bridge().insert_blockchain()
    })
}

/// Destroy a ledger. Destroying twice fails with `InvalidParameter`.
#[no_mangle]
pub extern "C" fn chainbridge_blockchain_destroy(handle: Handle) -> BridgeError {
    guard_status("chainbridge_blockchain_destroy", || {
        bridge().registry()?.remove_blockchain(handle)
    })
}

/// Number of sealed blocks.
///
/// # Safety
/// `err` must be null or valid for writes of one `BridgeError`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_blockchain_height(handle: Handle, err: *mut BridgeError) -> u64 {
    guard("chainbridge_blockchain_height", err, 0, || {
        with_blockchain(handle, |b| Ok(b.ledger.height()))
    })
}

/// Hash of the last block as `0x`-prefixed lowercase hex.
///
/// # Returns
/// An owned string to release with `chainbridge_free_string`, or null on
/// error.
///
/// # Safety
/// `err` must be null or valid for writes of one `BridgeError`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_blockchain_latest_hash(
    handle: Handle,
    err: *mut BridgeError,
) -> *mut c_char {
    guard("chainbridge_blockchain_latest_hash", err, ptr::null_mut(), || {
        let hash = with_blockchain(handle, |b| Ok(b.ledger.latest_hash()))?;
        into_c_string(hash_to_hex(&hash))
    })
}

/// Validate and apply a transaction, adding it to the pending pool.
///
/// # Returns
/// true on success. A rejected transaction yields `TransactionError` and
/// leaves the ledger unchanged.
///
/// # Safety
/// - The pointers inside `tx` must be valid as documented on `CTransaction`
/// - `err` must be null or valid for writes of one `BridgeError`
#[no_mangle]
pub unsafe extern "C" fn chainbridge_blockchain_add_transaction(
    handle: Handle,
    tx: CTransaction,
    err: *mut BridgeError,
) -> bool {
    guard("chainbridge_blockchain_add_transaction", err, false, || {
        with_blockchain(handle, |b| b.ledger.apply_transaction(tx.to_transaction()?))?;
        Ok(true)
    })
}

/// Balance of `address`, 0 for an unknown account.
///
/// # Safety
/// - `address` must be null or a NUL-terminated string
/// - `err` must be null or valid for writes of one `BridgeError`
#[no_mangle]
pub unsafe extern "C" fn chainbridge_blockchain_get_balance(
    handle: Handle,
    address: *const c_char,
    err: *mut BridgeError,
) -> u64 {
    guard("chainbridge_blockchain_get_balance", err, 0, || {
        with_blockchain(handle, |b| {
            let address = borrow_str(address, "address")?;
            Ok(b.ledger.get_balance(address))
        })
    })
}

/// Nonce of `address`, 0 for an unknown account.
///
/// # Safety
/// Same as `chainbridge_blockchain_get_balance`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_blockchain_get_nonce(
    handle: Handle,
    address: *const c_char,
    err: *mut BridgeError,
) -> u64 {
    guard("chainbridge_blockchain_get_nonce", err, 0, || {
        with_blockchain(handle, |b| {
            let address = borrow_str(address, "address")?;
            Ok(b.ledger.get_nonce(address))
        })
    })
}

/// Create `address` with `balance`, or reset an existing account's balance
/// (its nonce is kept).
///
/// # Safety
/// Same as `chainbridge_blockchain_get_balance`.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_blockchain_init_account(
    handle: Handle,
    address: *const c_char,
    balance: u64,
    err: *mut BridgeError,
) -> bool {
    guard("chainbridge_blockchain_init_account", err, false, || {
        with_blockchain(handle, |b| {
            let address = borrow_str(address, "address")?;
            b.ledger.init_account(address, balance)
        })?;
        Ok(true)
    })
}

/// Seal the pending pool into a block proposed by `validator`.
///
/// # Returns
/// The new height, or 0 on error. An empty pool fails with
/// `BlockchainError` unless empty blocks are enabled.
///
/// # Safety
/// - `validator` must be null or a NUL-terminated string
/// - `err` must be null or valid for writes of one `BridgeError`
#[no_mangle]
pub unsafe extern "C" fn chainbridge_blockchain_create_block(
    handle: Handle,
    validator: *const c_char,
    err: *mut BridgeError,
) -> u64 {
    guard("chainbridge_blockchain_create_block", err, 0, || {
        with_blockchain(handle, |b| {
            let validator = borrow_str(validator, "validator")?;
            Ok(b.ledger.create_block(validator)?.height)
        })
    })
}
