//! `repr(C)` argument and result types, and their release functions.

use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::slice;

use chainbridge_primitives::{CoreError, CoreResult, Transaction};

/// A transaction as passed by C callers.
///
/// `from` and `to` are NUL-terminated UTF-8. `signature` may be null when
/// `signature_len` is 0. All pointers are borrowed for the duration of the
/// call only.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CTransaction {
    pub from: *const c_char,
    pub to: *const c_char,
    pub amount: u64,
    pub gas_fee: u64,
    pub timestamp: u64,
    pub nonce: u64,
    pub signature: *const u8,
    pub signature_len: usize,
}

impl CTransaction {
    /// Copy into an owned [`Transaction`].
    ///
    /// # Safety
    /// Every non-null pointer must be valid as documented on the struct.
    pub unsafe fn to_transaction(&self) -> CoreResult<Transaction> {
        Ok(Transaction {
            from: borrow_str(self.from, "from")?.to_owned(),
            to: borrow_str(self.to, "to")?.to_owned(),
            amount: self.amount,
            gas_fee: self.gas_fee,
            timestamp: self.timestamp,
            nonce: self.nonce,
            signature: borrow_bytes(self.signature, self.signature_len, "signature")?.to_vec(),
        })
    }
}

/// A byte buffer.
///
/// As an argument it is borrowed. As a result it is owned by the caller and
/// must be released with [`chainbridge_free_bytes`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CByteArray {
    pub data: *mut u8,
    pub len: usize,
}

impl CByteArray {
    pub fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            len: 0,
        }
    }

    /// Hand ownership of `bytes` to the caller.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        let boxed = bytes.into_boxed_slice();
        let len = boxed.len();
        let data = Box::into_raw(boxed) as *mut u8;
        Self { data, len }
    }

    /// Borrow the contents.
    ///
    /// # Safety
    /// `data` must be null with `len == 0`, or valid for reads of `len` bytes.
    pub unsafe fn as_slice<'a>(&self, what: &str) -> CoreResult<&'a [u8]> {
        borrow_bytes(self.data, self.len, what)
    }
}

/// Borrow a NUL-terminated UTF-8 argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn borrow_str<'a>(ptr: *const c_char, what: &str) -> CoreResult<&'a str> {
    if ptr.is_null() {
        return Err(CoreError::NullPointer(what.to_owned()));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| CoreError::InvalidUtf8(format!("{}: {}", what, e)))
}

/// # Safety
/// `ptr` must be null with `len == 0`, or valid for reads of `len` bytes.
pub(crate) unsafe fn borrow_bytes<'a>(ptr: *const u8, len: usize, what: &str) -> CoreResult<&'a [u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(CoreError::NullPointer(format!("{} ({} bytes)", what, len)));
    }
    Ok(slice::from_raw_parts(ptr, len))
}

/// Hand an owned string to the caller.
pub(crate) fn into_c_string(text: String) -> CoreResult<*mut c_char> {
    CString::new(text)
        .map(CString::into_raw)
        .map_err(|e| CoreError::Serialization(format!("string contains NUL: {}", e)))
}

/// Release a string returned by this library. Null is ignored.
///
/// # Safety
/// `s` must be null or a string returned by this library, released once.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Release a byte buffer returned by this library. An empty buffer is ignored.
///
/// # Safety
/// `bytes` must be a buffer returned by this library, unmodified, released
/// once.
#[no_mangle]
pub unsafe extern "C" fn chainbridge_free_bytes(bytes: CByteArray) {
    if bytes.data.is_null() || bytes.len == 0 {
        return;
    }
    let raw = ptr::slice_from_raw_parts_mut(bytes.data, bytes.len);
    drop(Box::from_raw(raw));
}
