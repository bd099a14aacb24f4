use crate::blockchain::core::frame::{Block, Frame};
use crate::crypto::{Sha256Hash, ZERO_HASH};
use std::fmt;

/// Why a block failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Malformed(String),
    HashMismatch { stored: Sha256Hash, computed: Sha256Hash },
    BrokenLink { expected: Sha256Hash, found: Sha256Hash },
    IndexGap { expected: u64, found: u64 },
    BadGenesis(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Violation::Malformed(msg) => write!(f, "Malformed frame: {}", msg),
            Violation::HashMismatch { stored, computed } => write!(
                f,
                "Hash mismatch: stored {}, computed {}",
                hex::encode(stored),
                hex::encode(computed)
            ),
            Violation::BrokenLink { expected, found } => write!(
                f,
                "Broken link: prevhash {} does not match predecessor hash {}",
                hex::encode(found),
                hex::encode(expected)
            ),
            Violation::IndexGap { expected, found } => {
                write!(f, "Index gap: expected {}, found {}", expected, found)
            }
            Violation::BadGenesis(msg) => write!(f, "Bad genesis block: {}", msg),
        }
    }
}

/// Outcome of walking a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid { blocks: usize },
    /// `height` is the block's position counted from genesis.
    Invalid { height: u64, violation: Violation },
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid { .. })
    }

    pub fn invalid_height(&self) -> Option<u64> {
        match self {
            Verification::Valid { .. } => None,
            Verification::Invalid { height, .. } => Some(*height),
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Verification::Valid { blocks } => write!(f, "Chain valid ({} blocks)", blocks),
            Verification::Invalid { height, violation } => {
                write!(f, "Block {} invalid: {}", height, violation)
            }
        }
    }
}

/// Decodes a frame and checks that its stored hash matches its contents.
pub fn check_frame(frame: &Frame) -> Result<Block, Violation> {
    let block = frame
        .decode()
        .map_err(|e| Violation::Malformed(e.to_string()))?;
    let computed = frame
        .compute_hash()
        .map_err(|e| Violation::Malformed(e.to_string()))?;

    if computed != block.hash {
        return Err(Violation::HashMismatch {
            stored: block.hash,
            computed,
        });
    }
    Ok(block)
}

pub fn check_genesis(block: &Block) -> Result<(), Violation> {
    if block.index != 0 {
        return Err(Violation::BadGenesis(format!(
            "index must be 0, got {}",
            block.index
        )));
    }
    if block.prevhash != ZERO_HASH {
        return Err(Violation::BadGenesis(format!(
            "prevhash must be all zero, got {}",
            hex::encode(block.prevhash)
        )));
    }
    Ok(())
}

/// Checks that `block` directly follows `prev`.
pub fn check_link(prev: &Block, block: &Block) -> Result<(), Violation> {
    let expected = prev.index.checked_add(1).ok_or(Violation::IndexGap {
        expected: u64::MAX,
        found: block.index,
    })?;
    if block.index != expected {
        return Err(Violation::IndexGap {
            expected,
            found: block.index,
        });
    }
    if block.prevhash != prev.hash {
        return Err(Violation::BrokenLink {
            expected: prev.hash,
            found: block.prevhash,
        });
    }
    Ok(())
}

/// Verifies a chain given newest frame first.
///
/// Each frame is checked on its own first (decodable, self-hash, genesis
/// shape for the oldest one). Links are only checked against a predecessor
/// that passed its own check, so damage to one block is reported at that
/// block and not at its successor. The first failure on the walk from newest
/// to genesis is returned.
pub fn verify_frames<'a, I>(frames: I) -> Verification
where
    I: IntoIterator<Item = &'a Frame>,
{
    let frames: Vec<&Frame> = frames.into_iter().collect();
    let count = frames.len();

    let checked: Vec<Result<Block, Violation>> = frames
        .iter()
        .enumerate()
        .map(|(pos, frame)| {
            let block = check_frame(frame)?;
            if pos + 1 == count {
                check_genesis(&block)?;
            }
            Ok(block)
        })
        .collect();

    for (pos, result) in checked.iter().enumerate() {
        let height = (count - 1 - pos) as u64;
        let block = match result {
            Ok(block) => block,
            Err(violation) => {
                return Verification::Invalid {
                    height,
                    violation: violation.clone(),
                }
            }
        };

        if let Some(Ok(prev)) = checked.get(pos + 1) {
            if let Err(violation) = check_link(prev, block) {
                return Verification::Invalid { height, violation };
            }
        }
    }

    Verification::Valid { blocks: count }
}
