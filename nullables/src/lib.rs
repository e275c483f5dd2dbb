//! Nullable infrastructure for deterministic testing.
//!
//! The stores here are in-memory, never touch the filesystem, and can be told
//! to fail on demand so callers can exercise their error paths:
//! - [`NullBaseStore`] stands in for the block/transaction base store;
//! - [`NullDocumentStore`] stands in for the index storage port.
//!
//! Usage: swap real implementations for nullables in tests.

pub mod document;
pub mod store;

pub use document::NullDocumentStore;
pub use store::NullBaseStore;
