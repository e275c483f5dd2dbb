//! Abstract storage traits for the explorer.
//!
//! Two families of traits live here:
//! - the **base store** ([`BlockStore`], [`TransactionStore`]), the
//!   authoritative block/transaction persistence the indices are derived from;
//! - the **storage port** ([`DocumentStore`]), the engine-neutral interface the
//!   reference indices write to and scan.
//!
//! Backends (LMDB, in-memory) implement these traits. The index layer depends
//! only on the traits.

pub mod block;
pub mod document;
pub mod error;
pub mod memory;
pub mod scan;
pub mod transaction;

pub use block::BlockStore;
pub use document::{Collection, DocumentStore, IndexedDocument};
pub use error::StoreError;
pub use memory::MemoryDocumentStore;
pub use scan::{prefix_bounds, prefix_upper_bound, Order, Page, PageError};
pub use transaction::TransactionStore;

/// The full capability set the indexed store facade consumes.
pub trait BaseStore: BlockStore + TransactionStore + Send + Sync {}

impl<T: BlockStore + TransactionStore + Send + Sync> BaseStore for T {}
