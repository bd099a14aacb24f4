//! Integration tests for building, extending and verifying a ledger

use framechain::blockchain::{
    decode, encode, Block, Frame, Ledger, Verification, Violation, DEFAULT_GENESIS_RECORD,
    HEADER_SIZE, LAYOUT,
};
use framechain::crypto::{hash_frame, ZERO_HASH};
use framechain::error::ChainError;
use framechain::store::{BoundedFrameList, FrameList, SequenceStore};

/// Helper to build a ledger with genesis plus the given records
fn build_ledger(records: &[&[u8]]) -> Result<Ledger, ChainError> {
    let mut ledger = Ledger::new();
    ledger.root()?;
    for record in records {
        ledger.append(record)?;
    }
    Ok(ledger)
}

/// Frames ordered from genesis to newest
fn frames_oldest_first(ledger: &Ledger) -> Vec<Frame> {
    let mut frames = ledger.snapshot();
    frames.reverse();
    frames
}

#[test]
fn test_three_block_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = build_ledger(&[b"a", b"bb"])?;
    let frames = frames_oldest_first(&ledger);

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].len(), HEADER_SIZE + DEFAULT_GENESIS_RECORD.len());
    assert_eq!(frames[1].len(), HEADER_SIZE + 1);
    assert_eq!(frames[2].len(), HEADER_SIZE + 2);

    let blocks: Vec<Block> = frames.iter().map(Frame::decode).collect::<Result<_, _>>()?;
    assert_eq!(
        blocks.iter().map(|b| b.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(blocks[2].prevhash, hash_frame(frames[1].as_bytes())?);
    assert_eq!(blocks[1].prevhash, hash_frame(frames[0].as_bytes())?);
    assert_eq!(blocks[0].prevhash, ZERO_HASH);
    assert_eq!(blocks[2].record, b"bb".to_vec());

    assert_eq!(ledger.verify_chain()?, Verification::Valid { blocks: 3 });
    Ok(())
}

#[test]
fn test_chain_linkage_over_many_appends() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::new();
    ledger.root()?;
    for n in 1..=40u64 {
        let frame = ledger.append(format!("record {}", n).as_bytes())?;
        assert_eq!(frame.decode()?.index, n);
    }

    let frames = frames_oldest_first(&ledger);
    for pair in frames.windows(2) {
        let prev = &pair[0];
        let next = pair[1].decode()?;
        assert_eq!(next.prevhash, hash_frame(prev.as_bytes())?);
        assert_eq!(next.index, prev.decode()?.index + 1);
        assert_eq!(next.hash, hash_frame(pair[1].as_bytes())?);
    }
    assert!(ledger.verify_chain()?.is_valid());
    Ok(())
}

#[test]
fn test_genesis_shape() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = build_ledger(&[])?;
    let genesis = ledger.front_block()?;

    assert_eq!(genesis.index, 0);
    assert_eq!(genesis.prevhash, [0u8; 32]);
    assert_eq!(genesis.record, DEFAULT_GENESIS_RECORD.to_vec());
    assert!(genesis.timestamp > 0);
    Ok(())
}

#[test]
fn test_delete_front_never_changes_store() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = build_ledger(&[b"a", b"bb"])?;
    let before = ledger.snapshot();

    for _ in 0..3 {
        assert_eq!(ledger.delete_front(), Err(ChainError::ImmutableChain));
    }
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.snapshot(), before);
    Ok(())
}

#[test]
fn test_every_byte_outside_hash_slot_is_tamper_evident() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = build_ledger(&[b"a", b"middle record", b"ccc"])?;
    let frames = frames_oldest_first(&ledger);
    let target = 2usize;

    for offset in 0..frames[target].len() {
        if LAYOUT.hash.range().contains(&offset) {
            continue;
        }
        for bit in [0x01u8, 0x80] {
            let mut damaged = frames.clone();
            let mut bytes = damaged[target].to_vec();
            bytes[offset] ^= bit;
            damaged[target] = Frame::from(bytes);

            let copy = Ledger::from_store(Box::new(FrameList::from_oldest_first(damaged)?));
            let result = copy.verify_chain()?;
            assert_eq!(
                result.invalid_height(),
                Some(target as u64),
                "flipping bit {:#04x} of byte {} was reported as {:?}",
                bit,
                offset,
                result
            );
        }
    }
    Ok(())
}

#[test]
fn test_hash_slot_tamper_reported_at_damaged_block() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = build_ledger(&[b"a", b"bb"])?;
    let mut frames = frames_oldest_first(&ledger);

    let mut bytes = frames[1].to_vec();
    bytes[LAYOUT.hash.offset] ^= 0x01;
    frames[1] = Frame::from(bytes);

    let copy = Ledger::from_store(Box::new(FrameList::from_oldest_first(frames)?));
    assert_eq!(copy.verify_chain()?.invalid_height(), Some(1));
    Ok(())
}

#[test]
fn test_genesis_tamper_detected() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = build_ledger(&[b"a"])?;
    let mut frames = frames_oldest_first(&ledger);

    let mut bytes = frames[0].to_vec();
    bytes[HEADER_SIZE] ^= 0x20;
    frames[0] = Frame::from(bytes);

    let copy = Ledger::from_store(Box::new(FrameList::from_oldest_first(frames)?));
    let result = copy.verify_chain()?;
    assert_eq!(result.invalid_height(), Some(0));
    Ok(())
}

#[test]
fn test_appending_to_damaged_front_fails() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = build_ledger(&[b"a"])?;
    let mut frames = frames_oldest_first(&ledger);
    let mut bytes = frames[1].to_vec();
    bytes.truncate(HEADER_SIZE - 1);
    frames[1] = Frame::from(bytes);

    let mut copy = Ledger::from_store(Box::new(FrameList::from_oldest_first(frames)?));
    assert!(matches!(copy.append(b"b"), Err(ChainError::MalformedFrame(_))));
    assert_eq!(copy.len(), 2);
    assert!(matches!(
        copy.verify_chain()?,
        Verification::Invalid { height: 1, violation: Violation::Malformed(_) }
    ));
    Ok(())
}

#[test]
fn test_round_trip_preserves_fields() -> Result<(), Box<dyn std::error::Error>> {
    let blocks = [
        Block::new(0, ZERO_HASH, 0, Vec::new()),
        Block {
            prevhash: [0xAA; 32],
            hash: [0x55; 32],
            index: u64::MAX,
            timestamp: u64::MAX - 1,
            record: (0..=255u8).collect(),
        },
    ];

    for block in &blocks {
        let frame = encode(block);
        assert_eq!(frame.len(), HEADER_SIZE + block.record.len());
        assert_eq!(decode(frame.as_bytes())?, *block);
    }
    Ok(())
}

#[test]
fn test_decode_declared_size_past_end() {
    let block = Block::new(3, [1u8; 32], 9, b"abcd".to_vec());
    let mut bytes = encode(&block).to_vec();
    bytes[LAYOUT.record_sz.range()].copy_from_slice(&1000u64.to_le_bytes());

    assert!(matches!(decode(&bytes), Err(ChainError::MalformedFrame(_))));
    assert!(matches!(decode(&bytes[..10]), Err(ChainError::MalformedFrame(_))));
}

#[test]
fn test_bounded_store_allocation_failure() -> Result<(), Box<dyn std::error::Error>> {
    let genesis_size = HEADER_SIZE + DEFAULT_GENESIS_RECORD.len();
    let store = BoundedFrameList::new(None, Some(genesis_size + HEADER_SIZE + 4));
    let mut ledger = Ledger::with_store(Box::new(store));

    ledger.root()?;
    ledger.append(b"four")?;
    let front = ledger.peek_front().cloned();

    assert!(matches!(ledger.append(b"x"), Err(ChainError::AllocationFailure(_))));
    assert_eq!(ledger.peek_front().cloned(), front);
    assert!(ledger.verify_chain()?.is_valid());
    Ok(())
}

/// A store that refuses to grow once it holds a frame.
struct SingleSlotStore {
    slot: Option<Frame>,
}

impl SequenceStore for SingleSlotStore {
    fn insert_front(&mut self, frame: Frame) -> Result<(), ChainError> {
        if self.slot.is_some() {
            return Err(ChainError::AllocationFailure("single slot taken".to_string()));
        }
        self.slot = Some(frame);
        Ok(())
    }

    fn peek_front(&self) -> Option<&Frame> {
        self.slot.as_ref()
    }

    fn len(&self) -> usize {
        usize::from(self.slot.is_some())
    }

    fn frames(&self) -> Box<dyn Iterator<Item = &Frame> + '_> {
        Box::new(self.slot.iter())
    }
}

#[test]
fn test_ledger_uses_any_sequence_store() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::with_store(Box::new(SingleSlotStore { slot: None }));
    ledger.root()?;

    let err = ledger.append(b"a").unwrap_err();
    assert_eq!(err, ChainError::AllocationFailure("single slot taken".to_string()));
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.verify_chain()?, Verification::Valid { blocks: 1 });
    Ok(())
}
