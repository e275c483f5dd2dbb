//! The storage port the reference indices are written against.
//!
//! A collection holds opaque document bodies. Each document has a **primary
//! key** (an upsert with the same primary key replaces the document) and an
//! **ordering key** (scans return documents in ordering-key order). Both are
//! byte strings chosen by the caller, so any engine with ordered byte keys can
//! back the port.

use crate::{Order, Page, StoreError};

/// The named collections maintained by the explorer indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Transaction id → containing block (forward references).
    TxReferences,
    /// Signer address → authored transactions.
    SignerReferences,
    /// Updated address → transactions that touched it.
    UpdatedAddressReferences,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::TxReferences,
        Collection::SignerReferences,
        Collection::UpdatedAddressReferences,
    ];

    /// Name of the collection (and of its primary table).
    pub fn name(&self) -> &'static str {
        match self {
            Collection::TxReferences => "block_ref",
            Collection::SignerReferences => "signer_ref",
            Collection::UpdatedAddressReferences => "updated_address_ref",
        }
    }

    /// Name of the table holding the collection's ordering index.
    pub fn ordering_name(&self) -> &'static str {
        match self {
            Collection::TxReferences => "block_ref_order",
            Collection::SignerReferences => "signer_ref_order",
            Collection::UpdatedAddressReferences => "updated_address_ref_order",
        }
    }
}

/// A document ready to be upserted.
#[derive(Clone, Copy, Debug)]
pub struct IndexedDocument<'a> {
    pub primary_key: &'a [u8],
    pub ordering_key: &'a [u8],
    pub body: &'a [u8],
}

/// Engine-neutral document storage with upsert and ordered range scans.
///
/// Each call is atomic on its own; nothing groups calls together.
pub trait DocumentStore: Send + Sync {
    /// Create the collection and its ordering index if they do not exist yet.
    fn ensure_collection(&self, collection: Collection) -> Result<(), StoreError>;

    /// Insert or replace the document with `doc.primary_key`.
    ///
    /// When a document is replaced, its previous ordering entry is removed.
    fn upsert(&self, collection: Collection, doc: IndexedDocument<'_>) -> Result<(), StoreError>;

    /// Body of the document with the given primary key.
    fn get(&self, collection: Collection, primary_key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Bodies of documents whose ordering key starts with `prefix`, in
    /// ordering-key order, windowed by `page`.
    ///
    /// A collection that was never created scans as empty.
    fn scan(
        &self,
        collection: Collection,
        prefix: &[u8],
        order: Order,
        page: Page,
    ) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Number of documents in the collection.
    fn count(&self, collection: Collection) -> Result<u64, StoreError>;
}
