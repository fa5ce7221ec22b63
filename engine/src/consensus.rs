//! Stake-weighted validator set and deterministic proposer selection.
//!
//! Selection is a pure function of the validator set and a `u64` seed:
//!
//! ```text
//! r      = u128::from_le_bytes(SHA-256("chainbridge/proposer" || seed_le)[..16])
//! target = r % total_stake
//! winner = first validator, in address order, whose cumulative stake > target
//! ```
//!
//! Over many seeds a validator wins with probability `stake / total_stake`.

use std::collections::BTreeMap;

use chainbridge_primitives::{crypto::hash_sha256, CoreError, CoreResult, Validator};
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::validation::validate_address;

/// Domain separator for the selection draw.
const PROPOSER_DOMAIN: &[u8] = b"chainbridge/proposer";

/// Map a seed to a uniform 128-bit draw.
fn selection_draw(seed: u64) -> u128 {
    let mut preimage = Vec::with_capacity(PROPOSER_DOMAIN.len() + 8);
    preimage.extend_from_slice(PROPOSER_DOMAIN);
    preimage.extend_from_slice(&seed.to_le_bytes());
    let digest = hash_sha256(&preimage);

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    u128::from_le_bytes(bytes)
}

/// Validators keyed by address.
#[derive(Debug, Clone, Default)]
pub struct ValidatorSet {
    min_stake: u64,
    validators: BTreeMap<String, Validator>,
}

impl ValidatorSet {
    /// Create an empty set that rejects stakes below `min_stake`.
    pub fn new(min_stake: u64) -> Self {
        Self {
            min_stake,
            validators: BTreeMap::new(),
        }
    }

    /// Insert `address` or replace its stake.
    ///
    /// `blocks_proposed` survives a stake update.
    pub fn add_validator(&mut self, address: &str, stake: u64) -> CoreResult<()> {
        validate_address(address, "validator")?;
        if stake == 0 {
            return Err(CoreError::InvalidParameter("stake must be > 0".into()));
        }
        if stake < self.min_stake {
            return Err(CoreError::InvalidParameter(format!(
                "stake {} below minimum {}",
                stake, self.min_stake
            )));
        }

        match self.validators.get_mut(address) {
            Some(existing) => {
                info!(address, old_stake = existing.stake, stake, "validator stake updated");
                existing.stake = stake;
            }
            None => {
                info!(address, stake, "validator added");
                self.validators
                    .insert(address.to_owned(), Validator::new(address, stake));
            }
        }
        Ok(())
    }

    pub fn remove_validator(&mut self, address: &str) -> CoreResult<Validator> {
        let removed = self
            .validators
            .remove(address)
            .ok_or_else(|| CoreError::Consensus(format!("unknown validator: {}", address)))?;
        info!(address, stake = removed.stake, "validator removed");
        Ok(removed)
    }

    pub fn get(&self, address: &str) -> Option<&Validator> {
        self.validators.get(address)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Validators in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.values()
    }

    pub fn total_stake(&self) -> u128 {
        self.validators.values().map(|v| u128::from(v.stake)).sum()
    }

    /// Signatures needed for a two-thirds majority: `floor(2n/3) + 1`.
    pub fn required_signatures(&self) -> usize {
        self.validators.len() * 2 / 3 + 1
    }

    /// Pick the proposer for `seed`. Pure; fails with `ConsensusError` when
    /// the set holds no stake.
    pub fn select_proposer(&self, seed: u64) -> CoreResult<&Validator> {
        let total = self.total_stake();
        if total == 0 {
            return Err(CoreError::Consensus("validator set is empty".into()));
        }

        let target = selection_draw(seed) % total;
        let mut cumulative: u128 = 0;
        for validator in self.validators.values() {
            cumulative += u128::from(validator.stake);
            if cumulative > target {
                return Ok(validator);
            }
        }
        Err(CoreError::Internal(format!(
            "no validator covers target {} of {}",
            target, total
        )))
    }

    fn record_proposal(&mut self, address: &str) {
        if let Some(v) = self.validators.get_mut(address) {
            v.blocks_proposed = v.blocks_proposed.saturating_add(1);
        }
    }
}

/// A validator set plus the round counter used by seedless selection.
///
/// This is the "consensus" instance behind a bridge handle.
#[derive(Debug, Clone, Default)]
pub struct ConsensusEngine {
    set: ValidatorSet,
    round: u64,
}

impl ConsensusEngine {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            set: ValidatorSet::new(config.min_validator_stake),
            round: 0,
        }
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.set
    }

    /// Next round to be drawn by [`ConsensusEngine::next_proposer`].
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn add_validator(&mut self, address: &str, stake: u64) -> CoreResult<()> {
        self.set.add_validator(address, stake)
    }

    pub fn remove_validator(&mut self, address: &str) -> CoreResult<Validator> {
        self.set.remove_validator(address)
    }

    /// Select with `seed = round`, credit the winner and advance the round.
    ///
    /// On failure the round is not advanced.
    pub fn next_proposer(&mut self) -> CoreResult<String> {
        let round = self.round;
        let winner = self.set.select_proposer(round)?.address.clone();
        self.set.record_proposal(&winner);
        self.round = round.wrapping_add(1);
        debug!(round, proposer = %winner, "proposer selected");
        Ok(winner)
    }

    /// Proposer for `height`, using the height as seed. Pure.
    pub fn select_proposer_for_height(&self, height: u64) -> CoreResult<String> {
        Ok(self.set.select_proposer(height)?.address.clone())
    }
}
