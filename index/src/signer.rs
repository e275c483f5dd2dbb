//! Signer → authored transactions, ordered by nonce.

use std::sync::Arc;

use explorer_store::{Collection, DocumentStore, Order, Page};
use explorer_types::{Address, TxId};

use crate::address::AddressReferenceIndex;
use crate::{AddressTxReference, IndexError};

/// Signer reference index over the `signer_ref` collection.
#[derive(Clone)]
pub struct SignerReferenceIndex {
    inner: AddressReferenceIndex,
}

impl SignerReferenceIndex {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: AddressReferenceIndex::new(store, Collection::SignerReferences),
        }
    }

    /// Record that `signer` authored `tx_id` at `nonce`. Idempotent.
    pub fn record_signer_reference(
        &self,
        tx_id: &TxId,
        nonce: u64,
        signer: &Address,
    ) -> Result<(), IndexError> {
        self.inner.record(tx_id, nonce, signer)
    }

    /// Transactions authored by `signer`, by nonce.
    pub fn query_signer_references(
        &self,
        signer: &Address,
        order: Order,
        page: Page,
    ) -> Result<Vec<TxId>, IndexError> {
        self.inner.tx_ids(signer, order, page)
    }

    /// Same as [`Self::query_signer_references`] but with the nonce attached.
    pub fn signer_references(
        &self,
        signer: &Address,
        order: Order,
        page: Page,
    ) -> Result<Vec<AddressTxReference>, IndexError> {
        self.inner.references(signer, order, page)
    }

    pub fn len(&self) -> Result<u64, IndexError> {
        self.inner.len()
    }

    pub fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.len()? == 0)
    }
}
