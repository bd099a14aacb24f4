//! Cryptographic primitives for FrameChain

use crate::blockchain::core::frame::LAYOUT;
use crate::error::ChainError;
use sha2::{Digest, Sha256};

/// Width of every digest stored in a frame (SHA-256).
pub const HASH_SIZE: usize = 32;

/// Type alias for a frame digest. The frame layout reserves exactly
/// [`HASH_SIZE`] bytes for each of `prevhash` and `hash`.
pub type Sha256Hash = [u8; HASH_SIZE];

/// The `prevhash` of the genesis block.
pub const ZERO_HASH: Sha256Hash = [0u8; HASH_SIZE];

/// Computes the digest of a framed block.
///
/// The 32 bytes of the `hash` slot are left out of the input entirely, so the
/// digest is `SHA-256(frame[0..32] || frame[64..])`. Whatever sits in the slot
/// (zeros while sealing, the real digest once stored) never affects the result,
/// which is what lets construction and verification share this function.
pub fn hash_frame(frame: &[u8]) -> Result<Sha256Hash, ChainError> {
    if frame.len() < LAYOUT.header_size() {
        return Err(ChainError::MalformedFrame(format!(
            "Frame must be at least {} bytes to hash, got {}",
            LAYOUT.header_size(),
            frame.len()
        )));
    }

    let mut hasher = Sha256::new();
    hasher.update(&frame[..LAYOUT.hash.offset]);
    hasher.update(&frame[LAYOUT.hash.end()..]);
    Ok(hasher.finalize().into())
}

/// Convert a digest to a hex string for display.
pub fn hash_to_hex(hash: &Sha256Hash) -> String {
    hex::encode(hash)
}
