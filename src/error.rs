//! Error types for FrameChain

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),
    #[error("Chain is empty; the genesis block has not been created")]
    EmptyChain,
    #[error("Committed blocks are immutable and cannot be deleted or modified")]
    ImmutableChain,
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),
    #[error("Ledger already holds a genesis block and cannot be re-initialized")]
    Reinitialization,
    #[error("Invalid block: {0}")]
    InvalidBlock(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
