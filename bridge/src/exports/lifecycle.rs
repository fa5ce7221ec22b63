//! Bridge initialisation and shutdown.

use crate::error::{guard_status, BridgeError};
use crate::state::bridge;

/// Initialise the bridge.
///
/// Loads configuration from the YAML file named by `CHAINBRIDGE_CONFIG`
/// (defaults when unset) and installs the log subscriber. Calling it again
/// while initialised is a no-op.
///
/// # Returns
/// `Success`, or `InvalidParameter` for an unreadable or invalid
/// configuration.
#[no_mangle]
pub extern "C" fn chainbridge_init() -> BridgeError {
    guard_status("chainbridge_init", || bridge().init())
}

/// Shut the bridge down.
///
/// Releases every live instance; all outstanding handles become invalid,
/// including after a later re-init. Idempotent.
#[no_mangle]
pub extern "C" fn chainbridge_shutdown() -> BridgeError {
    guard_status("chainbridge_shutdown", || {
        bridge().shutdown();
        Ok(())
    })
}
