//! Shared helpers for the `framechain` binary.

use crate::blockchain::{Block, Ledger, Verification};
use crate::config::{load_config_from, Config, DEFAULT_CONFIG_PATH};
use crate::crypto::hash_to_hex;
use crate::error::ChainError;
use crate::store::{store_from_config, FrameList};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) -> Result<(), ChainError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ChainError::ConfigError(format!("Invalid log level '{}': {}", level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| ChainError::ConfigError(format!("Failed to install logger: {}", e)))
}

/// Load the config from `path`, or from `config.toml` when no path is given.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ChainError> {
    match path {
        Some(path) => load_config_from(path),
        None => load_config_from(DEFAULT_CONFIG_PATH),
    }
}

/// Build a ledger from the config and append `records` after genesis.
pub fn new_ledger_with_records<S: AsRef<[u8]>>(
    config: &Config,
    records: &[S],
) -> Result<Ledger, ChainError> {
    let mut ledger = new_ledger(config)?;
    for record in records {
        ledger.append(record.as_ref())?;
    }
    Ok(ledger)
}

fn new_ledger(config: &Config) -> Result<Ledger, ChainError> {
    let mut ledger =
        Ledger::with_genesis_record(store_from_config(&config.store), config.genesis.seed_record());
    ledger.root()?;
    Ok(ledger)
}

/// Copy the ledger's frames, flip every bit of byte `offset` in the frame at
/// `height`, and open a new ledger over the damaged copy.
pub fn tampered_copy(ledger: &Ledger, height: u64, offset: usize) -> Result<Ledger, ChainError> {
    let mut frames = ledger.snapshot();
    frames.reverse();

    let position = usize::try_from(height)
        .ok()
        .filter(|&h| h < frames.len())
        .ok_or_else(|| {
            ChainError::InvalidBlock(format!(
                "No block at height {} (chain has {} blocks)",
                height,
                frames.len()
            ))
        })?;

    let mut bytes = frames[position].to_vec();
    let target = bytes.get_mut(offset).ok_or_else(|| {
        ChainError::InvalidBlock(format!(
            "Byte offset {} is outside the {}-byte frame at height {}",
            offset,
            frames[position].len(),
            height
        ))
    })?;
    *target ^= 0xFF;
    frames[position] = bytes.into();

    let store = FrameList::from_oldest_first(frames)?;
    Ok(Ledger::from_store(Box::new(store)))
}

#[derive(Debug, Serialize)]
pub struct BlockView {
    pub index: u64,
    pub timestamp: u64,
    pub prevhash: String,
    pub hash: String,
    pub record_sz: u64,
    pub record_hex: String,
    pub record_text: String,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        BlockView {
            index: block.index,
            timestamp: block.timestamp,
            prevhash: hash_to_hex(&block.prevhash),
            hash: hash_to_hex(&block.hash),
            record_sz: block.record_sz(),
            record_hex: hex::encode(&block.record),
            record_text: String::from_utf8_lossy(&block.record)
                .trim_end_matches('\0')
                .to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChainView {
    blocks: Vec<BlockView>,
    valid: bool,
    verification: String,
}

/// One `Display` dump per block, genesis first.
pub fn render_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_table(blocks: &[Block]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Index")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Time")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Prev Hash")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Hash")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Record")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
        ]);

    for block in blocks {
        let view = BlockView::from(block);
        table.add_row(vec![
            Cell::new(format!("#{}", view.index)).fg(TableColor::White),
            Cell::new(format_timestamp(view.timestamp)).fg(TableColor::Grey),
            Cell::new(short_hex(&view.prevhash)).fg(TableColor::Yellow),
            Cell::new(short_hex(&view.hash)).fg(TableColor::Green),
            Cell::new(format!("{} ({} bytes)", view.record_text, view.record_sz))
                .fg(TableColor::White),
        ]);
    }

    table
}

pub fn render_json(blocks: &[Block], verification: &Verification) -> Result<String, ChainError> {
    let view = ChainView {
        blocks: blocks.iter().map(BlockView::from).collect(),
        valid: verification.is_valid(),
        verification: verification.to_string(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

fn short_hex(hex_str: &str) -> String {
    if hex_str.len() > 16 {
        format!("{}...", &hex_str[..13])
    } else {
        hex_str.to_string()
    }
}

fn format_timestamp(timestamp: u64) -> String {
    use chrono::DateTime;

    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Invalid".to_string())
}
