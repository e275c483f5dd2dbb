//! LMDB storage backend for the explorer.
//!
//! Implements the base store traits and the index storage port from
//! `explorer-store` using the `heed` LMDB bindings. The base store and the
//! index store live in separate environments so the derived indices can be
//! dropped and rebuilt without touching authoritative data.

pub mod base;
pub mod block;
pub mod document;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod options;
pub mod transaction;

pub use base::LmdbBaseStore;
pub use document::LmdbDocumentStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::IntegrityReport;
pub use options::{IndexStoreConfig, LockingMode};
