use crate::blockchain::core::frame::{Block, Frame};
use crate::blockchain::core::validation::{verify_frames, Verification};
use crate::crypto::ZERO_HASH;
use crate::error::ChainError;
use crate::store::{FrameList, SequenceStore};
use tracing::{debug, info, warn};

/// Genesis record used when no seed is configured.
pub const DEFAULT_GENESIS_RECORD: &[u8] = b"this is the first block\0";

/// Current wall-clock time in Unix seconds.
pub fn now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// An append-only, hash-linked sequence of frames.
///
/// The ledger is `Empty` until [`Ledger::root`] writes the genesis block, and
/// `Populated` from then on. Blocks are only ever added at the front; nothing
/// already committed can be removed or changed.
pub struct Ledger {
    store: Box<dyn SequenceStore>,
    genesis_record: Vec<u8>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create an empty `Ledger` over an unbounded in-memory store.
    pub fn new() -> Self {
        Self::with_store(Box::new(FrameList::new()))
    }

    /// Create an empty `Ledger` over the provided store.
    pub fn with_store(store: Box<dyn SequenceStore>) -> Self {
        Self::with_genesis_record(store, DEFAULT_GENESIS_RECORD.to_vec())
    }

    pub fn with_genesis_record(store: Box<dyn SequenceStore>, genesis_record: Vec<u8>) -> Self {
        Ledger {
            store,
            genesis_record,
        }
    }

    /// Open a ledger over a store that may already hold frames. The frames are
    /// taken as they are; call [`Ledger::verify_chain`] to check them.
    pub fn from_store(store: Box<dyn SequenceStore>) -> Self {
        Self::with_store(store)
    }

    /// Build and insert the genesis block.
    pub fn root(&mut self) -> Result<Frame, ChainError> {
        if !self.store.is_empty() {
            warn!("Rejected re-initialization of a ledger holding {} frames", self.store.len());
            return Err(ChainError::Reinitialization);
        }

        let block = Block::new(0, ZERO_HASH, now(), self.genesis_record.clone());
        let (block, frame) = block.seal()?;
        self.store.insert_front(frame.clone())?;

        info!("Created genesis block {}", hex::encode(block.hash));
        Ok(frame)
    }

    /// Append a record as a new block linked to the current front block.
    pub fn append(&mut self, record: &[u8]) -> Result<Frame, ChainError> {
        self.append_at(record, now())
    }

    /// Same as [`Ledger::append`] with an explicit timestamp.
    pub fn append_at(&mut self, record: &[u8], timestamp: u64) -> Result<Frame, ChainError> {
        let front = self.front_block()?;
        let index = front.index.checked_add(1).ok_or_else(|| {
            ChainError::InvalidBlock(format!("Block index overflow after {}", front.index))
        })?;

        let block = Block::new(index, front.hash, timestamp, record.to_vec());
        let (block, frame) = block.seal()?;
        self.store.insert_front(frame.clone())?;

        debug!(
            "Appended block {} ({} bytes, hash {})",
            block.index,
            frame.len(),
            hex::encode(block.hash)
        );
        Ok(frame)
    }

    /// Always fails: committed blocks cannot be deleted.
    pub fn delete_front(&mut self) -> Result<(), ChainError> {
        warn!("Rejected attempt to delete the front block");
        Err(ChainError::ImmutableChain)
    }

    /// Borrow the most recent frame.
    pub fn peek_front(&self) -> Option<&Frame> {
        self.store.peek_front()
    }

    /// Decode the most recent block.
    pub fn front_block(&self) -> Result<Block, ChainError> {
        self.store.peek_front().ok_or(ChainError::EmptyChain)?.decode()
    }

    /// Walk the chain from newest to genesis and check every block.
    pub fn verify_chain(&self) -> Result<Verification, ChainError> {
        if self.store.is_empty() {
            return Err(ChainError::EmptyChain);
        }

        let verification = verify_frames(self.store.frames());
        if let Verification::Invalid { height, violation } = &verification {
            warn!("Chain verification failed at block {}: {}", height, violation);
        }
        Ok(verification)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Frames from newest to genesis.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.store.frames()
    }

    /// Owned copies of all frames, newest first.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.store.frames().cloned().collect()
    }

    /// Decode every block, ordered from genesis to newest.
    pub fn blocks(&self) -> Result<Vec<Block>, ChainError> {
        let mut blocks = self
            .store
            .frames()
            .map(Frame::decode)
            .collect::<Result<Vec<_>, _>>()?;
        blocks.reverse();
        Ok(blocks)
    }

    pub fn genesis_record(&self) -> &[u8] {
        &self.genesis_record
    }
}
