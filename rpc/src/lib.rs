//! HTTP query API for the explorer.
//!
//! Provides endpoints for:
//! - Chain status and index sizes
//! - Forward references (transaction → block)
//! - Transactions by signer, ordered by nonce
//! - Transactions by updated address

pub mod error;
pub mod handlers;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use server::{router, ExplorerContext, RpcServer};
