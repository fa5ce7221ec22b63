//! The opaque request/response entry point.

use chainbridge_engine::abci::process;

use super::with_blockchain;
use crate::error::{guard, BridgeError};
use crate::registry::Handle;
use crate::types::CByteArray;

/// Process one encoded request against the ledger behind `handle`.
///
/// The handle is resolved before the request is decoded, so an unknown
/// handle is always `InvalidParameter`. Undecodable requests fail with
/// `DeserializationError`; lifecycle violations with `StateError`.
///
/// # Returns
/// The encoded response, owned by the caller and released with
/// `chainbridge_free_bytes`. Empty (null, 0) on error.
///
/// # Safety
/// - `request.data` must be null with `len == 0`, or valid for reads of
///   `request.len` bytes; it is only borrowed
/// - `err` must be null or valid for writes of one `BridgeError`
#[no_mangle]
pub unsafe extern "C" fn chainbridge_abci_process(
    handle: Handle,
    request: CByteArray,
    err: *mut BridgeError,
) -> CByteArray {
    guard("chainbridge_abci_process", err, CByteArray::empty(), || {
        let response = with_blockchain(handle, |b| {
            let bytes = request.as_slice("request")?;
            process(&mut b.ledger, &mut b.session, bytes)
        })?;
        Ok(CByteArray::from_vec(response))
    })
}
