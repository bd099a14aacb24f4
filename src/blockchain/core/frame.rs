//! Block framing.
//!
//! A [`Block`] is the convenient, in-memory form of a ledger entry. It is never
//! stored directly: the ledger only keeps [`Frame`]s, the padding-free byte
//! form produced by [`encode`], with every field at a fixed offset:
//!
//! | Field       | Offset | Size        |
//! |-------------|--------|-------------|
//! | `prevhash`  | 0      | 32          |
//! | `hash`      | 32     | 32          |
//! | `index`     | 64     | 8           |
//! | `timestamp` | 72     | 8           |
//! | `record_sz` | 80     | 8           |
//! | `record`    | 88     | `record_sz` |
//!
//! Integers are little-endian.

use crate::crypto::{hash_frame, Sha256Hash, HASH_SIZE, ZERO_HASH};
use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

const WORD_SIZE: usize = 8;

/// Position of one fixed-width field inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub offset: usize,
    pub size: usize,
}

impl FieldSpan {
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }

    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Offsets of every frame field. Both [`encode`] and [`decode`] read from this
/// table; nothing else in the crate hard-codes a frame offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub prevhash: FieldSpan,
    pub hash: FieldSpan,
    pub index: FieldSpan,
    pub timestamp: FieldSpan,
    pub record_sz: FieldSpan,
    pub record_offset: usize,
}

impl FrameLayout {
    /// Size of the fixed part of every frame.
    pub const fn header_size(&self) -> usize {
        self.record_offset
    }

    /// Total size of a frame carrying `record_len` record bytes.
    pub const fn frame_size(&self, record_len: usize) -> usize {
        self.record_offset + record_len
    }
}

pub const LAYOUT: FrameLayout = FrameLayout {
    prevhash: FieldSpan { offset: 0, size: HASH_SIZE },
    hash: FieldSpan { offset: HASH_SIZE, size: HASH_SIZE },
    index: FieldSpan { offset: 2 * HASH_SIZE, size: WORD_SIZE },
    timestamp: FieldSpan { offset: 2 * HASH_SIZE + WORD_SIZE, size: WORD_SIZE },
    record_sz: FieldSpan { offset: 2 * HASH_SIZE + 2 * WORD_SIZE, size: WORD_SIZE },
    record_offset: 2 * HASH_SIZE + 3 * WORD_SIZE,
};

/// Size of the frame header (88 bytes).
pub const HEADER_SIZE: usize = LAYOUT.header_size();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub prevhash: Sha256Hash,
    pub hash: Sha256Hash,
    pub index: u64,
    pub timestamp: u64,
    #[serde(with = "serde_bytes")]
    pub record: Vec<u8>,
}

impl Block {
    /// Creates an unsealed block; its `hash` stays zero until [`Block::seal`].
    pub fn new(index: u64, prevhash: Sha256Hash, timestamp: u64, record: Vec<u8>) -> Self {
        Block {
            prevhash,
            hash: ZERO_HASH,
            index,
            timestamp,
            record,
        }
    }

    /// Length of the record, as written to the `record_sz` field.
    pub fn record_sz(&self) -> u64 {
        self.record.len() as u64
    }

    /// Size in bytes of this block once framed.
    pub fn frame_size(&self) -> usize {
        LAYOUT.frame_size(self.record.len())
    }

    /// Digest of this block's frame with the hash slot excluded.
    pub fn compute_hash(&self) -> Result<Sha256Hash, ChainError> {
        hash_frame(&encode_to_vec(self))
    }

    /// Frames the block, hashes the frame and writes the digest into both the
    /// frame's hash slot and `self.hash`.
    pub fn seal(mut self) -> Result<(Self, Frame), ChainError> {
        let mut buf = encode_to_vec(&self);
        let hash = hash_frame(&buf)?;
        buf[LAYOUT.hash.range()].copy_from_slice(&hash);
        self.hash = hash;
        Ok((self, Frame::from(buf)))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", "-".repeat(73))?;
        writeln!(f, "phash: {}", hex::encode(self.prevhash))?;
        writeln!(f, "hash : {}", hex::encode(self.hash))?;
        writeln!(f, "index: {}", self.index)?;
        writeln!(f, "tstmp: {}", self.timestamp)?;
        writeln!(f, "recsz: {}", self.record_sz())?;
        write!(f, "recrd: {}", hex::encode(&self.record))
    }
}

/// A framed block as held by a [`SequenceStore`](crate::store::SequenceStore).
///
/// Frames are raw bytes: nothing about them is validated until they are
/// decoded or verified, so a store can hold (and the ledger can detect) a
/// damaged frame. Cloning is cheap; the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Arc<[u8]>);

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the frame into an owned [`Block`].
    pub fn decode(&self) -> Result<Block, ChainError> {
        decode(&self.0)
    }

    /// Reads the digest stored in the frame's hash slot.
    pub fn stored_hash(&self) -> Result<Sha256Hash, ChainError> {
        check_header(&self.0)?;
        Ok(read_hash(&self.0, LAYOUT.hash))
    }

    /// Recomputes the frame's digest from its bytes.
    pub fn compute_hash(&self) -> Result<Sha256Hash, ChainError> {
        hash_frame(&self.0)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Frame(Arc::from(bytes))
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Writes a block into a new frame. The hash slot receives `block.hash` as is.
pub fn encode(block: &Block) -> Frame {
    Frame::from(encode_to_vec(block))
}

fn encode_to_vec(block: &Block) -> Vec<u8> {
    let mut buf = vec![0u8; block.frame_size()];
    buf[LAYOUT.prevhash.range()].copy_from_slice(&block.prevhash);
    buf[LAYOUT.hash.range()].copy_from_slice(&block.hash);
    buf[LAYOUT.index.range()].copy_from_slice(&block.index.to_le_bytes());
    buf[LAYOUT.timestamp.range()].copy_from_slice(&block.timestamp.to_le_bytes());
    buf[LAYOUT.record_sz.range()].copy_from_slice(&block.record_sz().to_le_bytes());
    buf[LAYOUT.record_offset..].copy_from_slice(&block.record);
    buf
}

/// Reads a frame back into its fields, copying everything out of `bytes`.
///
/// The buffer must be exactly `88 + record_sz` bytes long.
pub fn decode(bytes: &[u8]) -> Result<Block, ChainError> {
    check_header(bytes)?;

    let declared = read_u64(bytes, LAYOUT.record_sz);
    let record_len = usize::try_from(declared).map_err(|_| {
        ChainError::MalformedFrame(format!("Declared record_sz {} does not fit in memory", declared))
    })?;
    let expected = LAYOUT.record_offset.checked_add(record_len).ok_or_else(|| {
        ChainError::MalformedFrame(format!("Declared record_sz {} overflows the frame size", declared))
    })?;

    if expected > bytes.len() {
        return Err(ChainError::MalformedFrame(format!(
            "Declared record_sz {} reads past the end of a {}-byte frame",
            declared,
            bytes.len()
        )));
    }
    if expected < bytes.len() {
        return Err(ChainError::MalformedFrame(format!(
            "{} trailing bytes after a {}-byte record",
            bytes.len() - expected,
            declared
        )));
    }

    Ok(Block {
        prevhash: read_hash(bytes, LAYOUT.prevhash),
        hash: read_hash(bytes, LAYOUT.hash),
        index: read_u64(bytes, LAYOUT.index),
        timestamp: read_u64(bytes, LAYOUT.timestamp),
        record: bytes[LAYOUT.record_offset..expected].to_vec(),
    })
}

fn check_header(bytes: &[u8]) -> Result<(), ChainError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ChainError::MalformedFrame(format!(
            "Frame must be at least {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }
    Ok(())
}

// Callers have already checked that `bytes` covers the header.
fn read_u64(bytes: &[u8], span: FieldSpan) -> u64 {
    let mut word = [0u8; WORD_SIZE];
    word.copy_from_slice(&bytes[span.range()]);
    u64::from_le_bytes(word)
}

fn read_hash(bytes: &[u8], span: FieldSpan) -> Sha256Hash {
    let mut hash = ZERO_HASH;
    hash.copy_from_slice(&bytes[span.range()]);
    hash
}
