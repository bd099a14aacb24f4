//! Frame storage backends.
//!
//! The ledger only ever pushes frames onto the front of a store and looks at
//! the front frame. Everything else about ownership and growth belongs to the
//! store, which is why the ledger holds a `Box<dyn SequenceStore>` rather than
//! a concrete container.

use crate::blockchain::core::frame::Frame;
use crate::config::StoreConfig;
use crate::error::ChainError;
use std::collections::VecDeque;

/// Abstraction for ordered frame containers. Position 0 is the front, i.e.
/// the most recently inserted frame.
pub trait SequenceStore: Send + Sync {
    /// Insert a frame in front of every stored frame. Fails with
    /// [`ChainError::AllocationFailure`] if the store cannot grow; the store
    /// is left unchanged in that case.
    fn insert_front(&mut self, frame: Frame) -> Result<(), ChainError>;

    /// Borrow the front frame, if any.
    fn peek_front(&self) -> Option<&Frame>;

    /// Number of stored frames.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate from the front (newest) to the back (oldest).
    fn frames(&self) -> Box<dyn Iterator<Item = &Frame> + '_>;
}

/// Unbounded in-memory store.
#[derive(Debug, Clone, Default)]
pub struct FrameList {
    frames: VecDeque<Frame>,
    bytes: usize,
}

impl FrameList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from frames given oldest first, so the last frame ends
    /// up at the front.
    pub fn from_oldest_first<I>(frames: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = Frame>,
    {
        let mut list = Self::new();
        for frame in frames {
            list.insert_front(frame)?;
        }
        Ok(list)
    }

    /// Total framed bytes held.
    pub fn total_bytes(&self) -> usize {
        self.bytes
    }
}

impl SequenceStore for FrameList {
    fn insert_front(&mut self, frame: Frame) -> Result<(), ChainError> {
        self.frames.try_reserve(1).map_err(|e| {
            ChainError::AllocationFailure(format!("Cannot grow frame list: {}", e))
        })?;
        self.bytes += frame.len();
        self.frames.push_front(frame);
        Ok(())
    }

    fn peek_front(&self) -> Option<&Frame> {
        self.frames.front()
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn frames(&self) -> Box<dyn Iterator<Item = &Frame> + '_> {
        Box::new(self.frames.iter())
    }
}

/// In-memory store with a fixed frame and/or byte budget.
#[derive(Debug, Clone, Default)]
pub struct BoundedFrameList {
    inner: FrameList,
    max_frames: Option<usize>,
    max_bytes: Option<usize>,
}

impl BoundedFrameList {
    pub fn new(max_frames: Option<usize>, max_bytes: Option<usize>) -> Self {
        Self {
            inner: FrameList::new(),
            max_frames,
            max_bytes,
        }
    }

    pub fn max_frames(&self) -> Option<usize> {
        self.max_frames
    }

    pub fn max_bytes(&self) -> Option<usize> {
        self.max_bytes
    }

    pub fn total_bytes(&self) -> usize {
        self.inner.total_bytes()
    }
}

impl SequenceStore for BoundedFrameList {
    fn insert_front(&mut self, frame: Frame) -> Result<(), ChainError> {
        if let Some(max) = self.max_frames {
            if self.inner.len() >= max {
                return Err(ChainError::AllocationFailure(format!(
                    "Store is full: {} of {} frames used",
                    self.inner.len(),
                    max
                )));
            }
        }
        if let Some(max) = self.max_bytes {
            let needed = self.inner.total_bytes().saturating_add(frame.len());
            if needed > max {
                return Err(ChainError::AllocationFailure(format!(
                    "Store is full: a {}-byte frame needs {} of {} bytes",
                    frame.len(),
                    needed,
                    max
                )));
            }
        }
        self.inner.insert_front(frame)
    }

    fn peek_front(&self) -> Option<&Frame> {
        self.inner.peek_front()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn frames(&self) -> Box<dyn Iterator<Item = &Frame> + '_> {
        self.inner.frames()
    }
}

/// Pick a backend for the given settings: unbounded unless a limit is set.
pub fn store_from_config(config: &StoreConfig) -> Box<dyn SequenceStore> {
    let max_frames = (config.max_frames > 0).then_some(config.max_frames);
    let max_bytes = (config.max_bytes > 0).then_some(config.max_bytes);

    if max_frames.is_none() && max_bytes.is_none() {
        Box::new(FrameList::new())
    } else {
        Box::new(BoundedFrameList::new(max_frames, max_bytes))
    }
}
