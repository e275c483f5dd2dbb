//! Fundamental types for the explorer.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! content hashes, account addresses, chain identifiers, and the block and
//! transaction shapes the indices are derived from.

pub mod address;
pub mod block;
pub mod chain;
mod encoding;
pub mod error;
pub mod hash;
pub mod transaction;

pub use address::Address;
pub use block::{Block, BlockHash};
pub use chain::ChainId;
pub use error::ParseIdError;
pub use hash::TxId;
pub use transaction::Transaction;
