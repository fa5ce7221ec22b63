//! The C-visible error struct and the call guard shared by every entry point.
//!
//! Every fallible entry point reports through a [`BridgeError`]: either as
//! its return value or written through a caller-supplied out pointer. A
//! non-success error owns a heap message that the caller releases with
//! [`chainbridge_free_error`].

use std::any::Any;
use std::ffi::{c_char, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use chainbridge_primitives::{CoreError, CoreResult, ErrorCode};
use tracing::{debug, error};

/// Error report returned across the C boundary.
///
/// `message` is null on success and an owned NUL-terminated string otherwise.
#[repr(C)]
#[derive(Debug)]
pub struct BridgeError {
    pub code: ErrorCode,
    pub message: *mut c_char,
}

impl BridgeError {
    pub fn success() -> Self {
        Self {
            code: ErrorCode::Success,
            message: ptr::null_mut(),
        }
    }

    /// Build an error report that owns a copy of `err`'s message.
    pub fn from_core(err: &CoreError) -> Self {
        Self {
            code: err.code(),
            message: owned_message(&err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Copy of the message, if any.
    ///
    /// # Safety
    /// `message` must be null or a string produced by this library that has
    /// not been released.
    pub unsafe fn message(&self) -> Option<String> {
        if self.message.is_null() {
            return None;
        }
        Some(CStr::from_ptr(self.message).to_string_lossy().into_owned())
    }

    /// Free the message and reset to success.
    ///
    /// # Safety
    /// Same contract as [`BridgeError::message`].
    pub unsafe fn release(&mut self) {
        if !self.message.is_null() {
            drop(CString::from_raw(self.message));
        }
        self.message = ptr::null_mut();
        self.code = ErrorCode::Success;
    }
}

/// Allocate a C copy of `text`. Interior NULs are escaped.
fn owned_message(text: &str) -> *mut c_char {
    let escaped = text.replace('\0', "\\0");
    CString::new(escaped).map_or(ptr::null_mut(), CString::into_raw)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".into()
    }
}

/// Run `f`, turning a panic into `InternalError`.
fn catch<T>(call: &'static str, f: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
    let result = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            error!(call, panic = %msg, "entry point panicked");
            Err(CoreError::Internal(format!("panic in {}: {}", call, msg)))
        }
    };
    if let Err(err) = &result {
        debug!(call, code = %err.code(), error = %err, "call failed");
    }
    result
}

/// Write `report` through `out`, or free it if `out` is null.
///
/// # Safety
/// `out` must be null or valid for writes of one `BridgeError`.
unsafe fn set_error(out: *mut BridgeError, mut report: BridgeError) {
    if out.is_null() {
        report.release();
    } else {
        ptr::write(out, report);
    }
}

/// Guard for entry points with a primary result and an error out pointer.
///
/// Returns `fallback` on error.
///
/// # Safety
/// `out` must be null or valid for writes of one `BridgeError`.
pub(crate) unsafe fn guard<T>(
    call: &'static str,
    out: *mut BridgeError,
    fallback: T,
    f: impl FnOnce() -> CoreResult<T>,
) -> T {
    match catch(call, f) {
        Ok(value) => {
            set_error(out, BridgeError::success());
            value
        }
        Err(err) => {
            set_error(out, BridgeError::from_core(&err));
            fallback
        }
    }
}

/// Guard for entry points that return their `BridgeError` directly.
pub(crate) fn guard_status(call: &'static str, f: impl FnOnce() -> CoreResult<()>) -> BridgeError {
    match catch(call, f) {
        Ok(()) => BridgeError::success(),
        Err(err) => BridgeError::from_core(&err),
    }
}

/// Release the message owned by `err` and reset it to success.
///
/// # Safety
/// - `err` must be null or point to a `BridgeError` filled in by this library
/// - The message must not have been released already
#[no_mangle]
pub unsafe extern "C" fn chainbridge_free_error(err: *mut BridgeError) {
    if let Some(err) = err.as_mut() {
        err.release();
    }
}
