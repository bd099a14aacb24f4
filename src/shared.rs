//! Thread-safe handle around a [`Ledger`].
//!
//! `append` reads the front block and then writes a new one, so every mutating
//! call holds the write lock for its whole duration. Verification only needs
//! committed frames, which never change: it clones them under a short read
//! lock and does the hashing with no lock held.

use crate::blockchain::core::chain::Ledger;
use crate::blockchain::core::frame::{Block, Frame};
use crate::blockchain::core::validation::{verify_frames, Verification};
use crate::error::ChainError;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn root(&self) -> Result<Frame, ChainError> {
        self.inner.write().root()
    }

    pub fn append(&self, record: &[u8]) -> Result<Frame, ChainError> {
        self.inner.write().append(record)
    }

    pub fn delete_front(&self) -> Result<(), ChainError> {
        self.inner.write().delete_front()
    }

    pub fn peek_front(&self) -> Option<Frame> {
        self.inner.read().peek_front().cloned()
    }

    pub fn front_block(&self) -> Result<Block, ChainError> {
        self.inner.read().front_block()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Frames committed so far, newest first.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.inner.read().snapshot()
    }

    pub fn verify_chain(&self) -> Result<Verification, ChainError> {
        let frames = self.snapshot();
        if frames.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        Ok(verify_frames(&frames))
    }
}
