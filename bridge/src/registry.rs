//! Generation-tagged handle table.
//!
//! A handle packs a slot index and the slot's generation:
//!
//! ```text
//! handle = (generation << 32) | (index + 1)
//! ```
//!
//! The low half is never zero, so 0 is never a valid handle. Releasing a
//! slot bumps its generation, which invalidates every handle issued for the
//! previous occupant. A slot whose generation would wrap is retired instead
//! of reused, so no handle value is ever issued twice.
//!
//! The table sits behind a `parking_lot::RwLock`; each instance behind its
//! own `Mutex`. Resolving a handle clones the instance `Arc` under the read
//! lock and drops the lock before the caller touches the instance.

use std::sync::Arc;

use chainbridge_engine::{BlockSession, ConsensusEngine, Ledger};
use chainbridge_primitives::{CoreError, CoreResult};
use parking_lot::{Mutex, RwLock};

/// Opaque instance identifier handed to C callers.
pub type Handle = u64;

/// A ledger plus the request-dispatcher state for its open block.
#[derive(Debug, Default)]
pub struct BlockchainInstance {
    pub ledger: Ledger,
    pub session: BlockSession,
}

impl BlockchainInstance {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            session: BlockSession::new(),
        }
    }
}

pub type SharedBlockchain = Arc<Mutex<BlockchainInstance>>;
pub type SharedConsensus = Arc<Mutex<ConsensusEngine>>;

#[derive(Debug, Clone)]
enum Entry {
    Blockchain(SharedBlockchain),
    Consensus(SharedConsensus),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Self::Blockchain(_) => "blockchain",
            Self::Consensus(_) => "consensus",
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug, Default)]
struct Table {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Table {
    fn insert(&mut self, entry: Entry) -> CoreResult<Handle> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                // index + 1 must fit in the low 32 bits
                let index = u32::try_from(self.slots.len())
                    .ok()
                    .filter(|i| *i < u32::MAX)
                    .ok_or_else(|| CoreError::Internal("handle table exhausted".into()))?;
                self.slots.push(Slot::default());
                index
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(entry);
        Ok(encode(index, slot.generation))
    }

    fn get(&self, handle: Handle) -> CoreResult<&Entry> {
        let (index, generation) = decode(handle)?;
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.entry.as_ref())
            .ok_or_else(|| unknown(handle))
    }

    fn release(&mut self, index: u32) -> Option<Entry> {
        let slot = &mut self.slots[index as usize];
        let entry = slot.entry.take()?;
        // An exhausted generation retires the slot.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(index);
        }
        Some(entry)
    }
}

fn encode(index: u32, generation: u32) -> Handle {
    (u64::from(generation) << 32) | u64::from(index + 1)
}

fn decode(handle: Handle) -> CoreResult<(u32, u32)> {
    let low = (handle & 0xFFFF_FFFF) as u32;
    let generation = (handle >> 32) as u32;
    match low.checked_sub(1) {
        Some(index) => Ok((index, generation)),
        None => Err(unknown(handle)),
    }
}

fn unknown(handle: Handle) -> CoreError {
    CoreError::InvalidParameter(format!("unknown or released handle {:#x}", handle))
}

fn wrong_kind(handle: Handle, expected: &str, found: &str) -> CoreError {
    CoreError::InvalidParameter(format!(
        "handle {:#x} is a {} handle, expected {}",
        handle, found, expected
    ))
}

/// Process-wide table of live instances.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    table: RwLock<Table>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_blockchain(&self, instance: BlockchainInstance) -> CoreResult<Handle> {
        self.table
            .write()
            .insert(Entry::Blockchain(Arc::new(Mutex::new(instance))))
    }

    pub fn insert_consensus(&self, engine: ConsensusEngine) -> CoreResult<Handle> {
        self.table
            .write()
            .insert(Entry::Consensus(Arc::new(Mutex::new(engine))))
    }

    pub fn blockchain(&self, handle: Handle) -> CoreResult<SharedBlockchain> {
        match self.table.read().get(handle)? {
            Entry::Blockchain(instance) => Ok(Arc::clone(instance)),
            other => Err(wrong_kind(handle, "blockchain", other.kind())),
        }
    }

    pub fn consensus(&self, handle: Handle) -> CoreResult<SharedConsensus> {
        match self.table.read().get(handle)? {
            Entry::Consensus(engine) => Ok(Arc::clone(engine)),
            other => Err(wrong_kind(handle, "consensus", other.kind())),
        }
    }

    /// Release a blockchain handle. A second release fails.
    pub fn remove_blockchain(&self, handle: Handle) -> CoreResult<()> {
        self.remove(handle, "blockchain")
    }

    /// Release a consensus handle. A second release fails.
    pub fn remove_consensus(&self, handle: Handle) -> CoreResult<()> {
        self.remove(handle, "consensus")
    }

    fn remove(&self, handle: Handle, expected: &str) -> CoreResult<()> {
        let mut table = self.table.write();
        let found = table.get(handle)?.kind();
        if found != expected {
            return Err(wrong_kind(handle, expected, found));
        }
        let (index, _) = decode(handle)?;
        // Dropped after the lock is released; callers may still hold clones.
        let entry = table.release(index);
        drop(table);
        drop(entry);
        Ok(())
    }

    /// Release every instance. Returns how many were live.
    pub fn clear(&self) -> usize {
        let mut table = self.table.write();
        let occupied: Vec<u32> = table
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.entry.is_some())
            .map(|(index, _)| index as u32)
            .collect();
        let released: Vec<Entry> = occupied
            .iter()
            .filter_map(|index| table.release(*index))
            .collect();
        drop(table);
        released.len()
    }

    pub fn blockchain_count(&self) -> usize {
        self.count(|e| matches!(e, Entry::Blockchain(_)))
    }

    pub fn consensus_count(&self) -> usize {
        self.count(|e| matches!(e, Entry::Consensus(_)))
    }

    fn count(&self, pred: impl Fn(&Entry) -> bool) -> usize {
        self.table
            .read()
            .slots
            .iter()
            .filter(|slot| slot.entry.as_ref().is_some_and(&pred))
            .count()
    }
}
