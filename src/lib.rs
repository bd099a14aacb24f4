//! FrameChain - an append-only, hash-linked ledger of padding-free block frames
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Blockchain
//! - [`blockchain`] - Block framing, the ledger and chain verification
//! - [`store`] - Frame storage backends behind the `SequenceStore` trait
//! - [`shared`] - Thread-safe ledger handle
//!
//! ## Cryptography
//! - [`crypto`] - SHA-256 frame digests
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - CLI utilities

#![forbid(unsafe_code)]

// ============================================================================
// Core Blockchain
// ============================================================================
pub mod blockchain;
pub mod shared;
pub mod store;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
