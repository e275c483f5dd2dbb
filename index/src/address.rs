//! Shared machinery for the address-keyed collections.

use std::sync::Arc;

use tracing::trace;

use explorer_store::{Collection, DocumentStore, IndexedDocument, Order, Page};
use explorer_types::{Address, TxId};

use crate::document::address_prefix;
use crate::{AddressTxReference, IndexError};

/// Address → transaction references ordered by nonce, then tx id.
#[derive(Clone)]
pub(crate) struct AddressReferenceIndex {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
}

impl AddressReferenceIndex {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, collection: Collection) -> Self {
        Self { store, collection }
    }

    pub(crate) fn record(
        &self,
        tx_id: &TxId,
        tx_nonce: u64,
        address: &Address,
    ) -> Result<(), IndexError> {
        self.store.ensure_collection(self.collection)?;

        let reference = AddressTxReference {
            address: *address,
            tx_nonce,
            tx_id: *tx_id,
        };
        let key = reference.key();
        let body = reference.encode()?;
        self.store.upsert(
            self.collection,
            IndexedDocument {
                primary_key: &key,
                ordering_key: &key,
                body: &body,
            },
        )?;

        trace!(
            collection = self.collection.name(),
            address = %address,
            nonce = tx_nonce,
            tx = %tx_id,
            "recorded address reference"
        );
        Ok(())
    }

    pub(crate) fn references(
        &self,
        address: &Address,
        order: Order,
        page: Page,
    ) -> Result<Vec<AddressTxReference>, IndexError> {
        self.store
            .scan(self.collection, &address_prefix(address), order, page)?
            .iter()
            .map(|body| AddressTxReference::decode(body))
            .collect()
    }

    pub(crate) fn tx_ids(
        &self,
        address: &Address,
        order: Order,
        page: Page,
    ) -> Result<Vec<TxId>, IndexError> {
        Ok(self
            .references(address, order, page)?
            .into_iter()
            .map(|r| r.tx_id)
            .collect())
    }

    pub(crate) fn len(&self) -> Result<u64, IndexError> {
        Ok(self.store.count(self.collection)?)
    }
}
