//! Process-wide bridge state.
//!
//! Holds the handle registry and the configuration loaded by
//! `chainbridge_init`. The configuration slot doubles as the initialised
//! flag: `None` means the bridge is shut down.

use std::sync::LazyLock;

use chainbridge_engine::{ConsensusEngine, Ledger};
use chainbridge_primitives::{CoreError, CoreResult};
use parking_lot::RwLock;
use tracing::info;

use crate::config::BridgeConfig;
use crate::logging::init_logging;
use crate::registry::{BlockchainInstance, Handle, HandleRegistry};

pub struct BridgeState {
    config: RwLock<Option<BridgeConfig>>,
    registry: HandleRegistry,
}

fn not_initialized() -> CoreError {
    CoreError::State("bridge is not initialised".into())
}

static BRIDGE: LazyLock<BridgeState> = LazyLock::new(BridgeState::new);

pub fn bridge() -> &'static BridgeState {
    &BRIDGE
}

impl BridgeState {
    fn new() -> Self {
        Self {
            config: RwLock::new(None),
            registry: HandleRegistry::new(),
        }
    }

    /// Load configuration and mark the bridge initialised. A second call
    /// while initialised is a no-op.
    pub fn init(&self) -> CoreResult<()> {
        let mut slot = self.config.write();
        if slot.is_some() {
            return Ok(());
        }

        let config = BridgeConfig::load()
            .map_err(|e| CoreError::InvalidParameter(format!("configuration: {}", e)))?;
        init_logging(&config.log_level);
        info!(
            allow_empty_blocks = config.allow_empty_blocks,
            min_validator_stake = config.min_validator_stake,
            genesis_accounts = config.genesis_accounts.len(),
            "bridge initialised"
        );
        *slot = Some(config);
        Ok(())
    }

    /// Release every handle and mark the bridge uninitialised. Idempotent.
    pub fn shutdown(&self) {
        let mut slot = self.config.write();
        let released = self.registry.clear();
        if slot.take().is_some() {
            info!(released, "bridge shut down");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config.read().is_some()
    }

    /// The registry, provided the bridge is initialised.
    pub fn registry(&self) -> CoreResult<&HandleRegistry> {
        if !self.is_initialized() {
            return Err(not_initialized());
        }
        Ok(&self.registry)
    }

    /// Run `f` against the configuration with the read lock held, so
    /// `shutdown` cannot clear the registry while `f` is inserting.
    fn with_config<T>(&self, f: impl FnOnce(&BridgeConfig) -> CoreResult<T>) -> CoreResult<T> {
        let slot = self.config.read();
        let config = slot.as_ref().ok_or_else(not_initialized)?;
        f(config)
    }

    /// Build a ledger with the configured policy and genesis accounts and
    /// register it.
    pub fn insert_blockchain(&self) -> CoreResult<Handle> {
        self.with_config(|config| {
            let mut ledger = Ledger::new(config.ledger_config());
            for account in &config.genesis_accounts {
                ledger.init_account(&account.address, account.balance)?;
            }
            self.registry.insert_blockchain(BlockchainInstance::new(ledger))
        })
    }

    pub fn insert_consensus(&self) -> CoreResult<Handle> {
        self.with_config(|config| {
            self.registry
                .insert_consensus(ConsensusEngine::new(&config.ledger_config()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbridge_primitives::ErrorCode;
    use std::sync::Arc;
    use std::thread;

    fn initialised() -> Arc<BridgeState> {
        let state = Arc::new(BridgeState::new());
        state.init().unwrap();
        state
    }

    #[test]
    fn test_insert_requires_init() {
        let state = BridgeState::new();
        let err = state.insert_blockchain().unwrap_err();
        assert_eq!(err.code(), ErrorCode::StateError);
        let err = state.insert_consensus().unwrap_err();
        assert_eq!(err.code(), ErrorCode::StateError);
        assert_eq!(state.registry.blockchain_count(), 0);
        assert_eq!(state.registry.consensus_count(), 0);
    }

    #[test]
    fn test_insert_after_shutdown_fails() {
        let state = initialised();
        let before = state.insert_blockchain().unwrap();
        state.shutdown();

        let err = state.insert_blockchain().unwrap_err();
        assert_eq!(err.code(), ErrorCode::StateError);
        assert_eq!(state.registry.blockchain_count(), 0);

        state.init().unwrap();
        let err = state.registry().unwrap().blockchain(before).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    // ── Test: shutdown racing instance creation leaves no live handle ──

    #[test]
    fn test_shutdown_during_concurrent_inserts() {
        let state = initialised();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    let mut issued = Vec::new();
                    loop {
                        let result = if i % 2 == 0 {
                            state.insert_blockchain()
                        } else {
                            state.insert_consensus()
                        };
                        match result {
                            Ok(handle) => issued.push(handle),
                            Err(err) => {
                                assert_eq!(err.code(), ErrorCode::StateError);
                                return issued;
                            }
                        }
                    }
                })
            })
            .collect();

        while state.registry.blockchain_count() + state.registry.consensus_count() < 64 {
            thread::yield_now();
        }
        state.shutdown();

        let issued: Vec<Handle> = workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect();
        assert!(!issued.is_empty());
        assert_eq!(state.registry.blockchain_count(), 0);
        assert_eq!(state.registry.consensus_count(), 0);

        state.init().unwrap();
        let registry = state.registry().unwrap();
        for handle in issued {
            assert!(registry.blockchain(handle).is_err());
            assert!(registry.consensus(handle).is_err());
        }
    }
}
