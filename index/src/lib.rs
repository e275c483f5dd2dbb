//! Secondary reference indices for the explorer.
//!
//! Three indices are derived from what the base store persists:
//! - [`ForwardReferenceIndex`]: transaction → the block last seen containing it,
//!   ordered by block height.
//! - [`SignerReferenceIndex`]: signer → authored transactions, ordered by nonce.
//! - [`UpdatedAddressReferenceIndex`]: any touched address → transactions,
//!   ordered by the originating transaction's nonce.
//!
//! [`IndexedStore`] wires them behind the base store's write path. The indices
//! only talk to the [`explorer_store::DocumentStore`] port and never to a
//! concrete engine.

mod address;
pub mod document;
pub mod error;
pub mod facade;
pub mod forward;
pub mod signer;
pub mod updated_address;

pub use document::{AddressTxReference, TxBlockReference};
pub use error::{IndexError, IndexedStoreError};
pub use explorer_store::{Order, Page};
pub use facade::{IndexCounts, IndexedStore, RebuildReport};
pub use forward::ForwardReferenceIndex;
pub use signer::SignerReferenceIndex;
pub use updated_address::UpdatedAddressReferenceIndex;
