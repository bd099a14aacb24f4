// Thin re-export module: implementation lives under `blockchain/core/` so
// framing, chain maintenance and validation stay in separate files.

pub mod core;
pub use core::*;
