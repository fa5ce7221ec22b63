//! Shared helpers for calling the exported C functions from Rust tests.
//!
//! Wraps the out-pointer convention so each test reads as a sequence of
//! `(result, code)` checks, and releases every returned allocation.

#![allow(dead_code)]

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use chainbridge::*;
use chainbridge_primitives::ErrorCode;

/// Outcome of one call: primary result, error code and message.
pub struct Outcome<T> {
    pub value: T,
    pub code: ErrorCode,
    pub message: Option<String>,
}

impl<T: std::fmt::Debug> Outcome<T> {
    /// Unwrap a successful call.
    pub fn ok(self) -> T {
        assert_eq!(self.code, ErrorCode::Success, "call failed: {:?}", self.message);
        self.value
    }

    /// Assert the call failed with `code`.
    pub fn expect_err(self, code: ErrorCode) -> Self {
        assert_eq!(self.code, code, "message: {:?}, value: {:?}", self.message, self.value);
        assert!(self.message.is_some());
        self
    }
}

/// Invoke `f` with a fresh error out pointer and collect the report.
pub fn call<T>(f: impl FnOnce(*mut BridgeError) -> T) -> Outcome<T> {
    let mut err = BridgeError::success();
    let value = f(&mut err);
    collect(value, err)
}

/// Collect a `BridgeError` returned by value.
pub fn status(err: BridgeError) -> Outcome<()> {
    collect((), err)
}

fn collect<T>(value: T, mut err: BridgeError) -> Outcome<T> {
    let code = err.code;
    let message = unsafe { err.message() };
    unsafe { chainbridge_free_error(&mut err) };
    Outcome { value, code, message }
}

pub fn cstr(s: &str) -> CString {
    CString::new(s).unwrap()
}

/// Copy and release a string returned by the library. Null maps to `None`.
pub fn take_string(s: *mut c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    let owned = unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_owned();
    unsafe { chainbridge_free_string(s) };
    Some(owned)
}

/// Copy and release a byte buffer returned by the library.
pub fn take_bytes(bytes: CByteArray) -> Vec<u8> {
    let copy = unsafe { bytes.as_slice("response") }.unwrap().to_vec();
    unsafe { chainbridge_free_bytes(bytes) };
    copy
}

// ── Setup ──

pub fn init() {
    status(chainbridge_init()).ok();
}

pub fn new_blockchain() -> Handle {
    let h = call(|e| unsafe { chainbridge_blockchain_new(e) }).ok();
    assert_ne!(h, 0);
    h
}

pub fn new_consensus() -> Handle {
    let h = call(|e| unsafe { chainbridge_consensus_new(e) }).ok();
    assert_ne!(h, 0);
    h
}

// ── Ledger calls ──

pub fn init_account(h: Handle, address: &str, balance: u64) -> Outcome<bool> {
    let address = cstr(address);
    call(|e| unsafe { chainbridge_blockchain_init_account(h, address.as_ptr(), balance, e) })
}

pub fn balance(h: Handle, address: &str) -> u64 {
    let address = cstr(address);
    call(|e| unsafe { chainbridge_blockchain_get_balance(h, address.as_ptr(), e) }).ok()
}

pub fn nonce(h: Handle, address: &str) -> u64 {
    let address = cstr(address);
    call(|e| unsafe { chainbridge_blockchain_get_nonce(h, address.as_ptr(), e) }).ok()
}

pub fn height(h: Handle) -> Outcome<u64> {
    call(|e| unsafe { chainbridge_blockchain_height(h, e) })
}

pub fn add_transfer(h: Handle, from: &str, to: &str, amount: u64, fee: u64, nonce: u64) -> Outcome<bool> {
    let from = cstr(from);
    let to = cstr(to);
    let sig = b"sig";
    let tx = CTransaction {
        from: from.as_ptr(),
        to: to.as_ptr(),
        amount,
        gas_fee: fee,
        timestamp: 1_700_000_000,
        nonce,
        signature: sig.as_ptr(),
        signature_len: sig.len(),
    };
    call(|e| unsafe { chainbridge_blockchain_add_transaction(h, tx, e) })
}

pub fn create_block(h: Handle, validator: &str) -> Outcome<u64> {
    let validator = cstr(validator);
    call(|e| unsafe { chainbridge_blockchain_create_block(h, validator.as_ptr(), e) })
}

pub fn latest_hash(h: Handle) -> Outcome<Option<String>> {
    let out = call(|e| unsafe { chainbridge_blockchain_latest_hash(h, e) });
    Outcome {
        value: take_string(out.value),
        code: out.code,
        message: out.message,
    }
}

// ── Consensus calls ──

pub fn add_validator(h: Handle, address: &str, stake: u64) -> Outcome<bool> {
    let address = cstr(address);
    call(|e| unsafe { chainbridge_consensus_add_validator(h, address.as_ptr(), stake, e) })
}

pub fn select_proposer(h: Handle) -> Outcome<Option<String>> {
    let out = call(|e| unsafe { chainbridge_consensus_select_proposer(h, e) });
    Outcome {
        value: take_string(out.value),
        code: out.code,
        message: out.message,
    }
}

// ── Request bridge ──

pub fn process(h: Handle, request: &[u8]) -> Outcome<Vec<u8>> {
    let arg = CByteArray {
        data: if request.is_empty() { ptr::null_mut() } else { request.as_ptr() as *mut u8 },
        len: request.len(),
    };
    let out = call(|e| unsafe { chainbridge_abci_process(h, arg, e) });
    Outcome {
        value: take_bytes(out.value),
        code: out.code,
        message: out.message,
    }
}
