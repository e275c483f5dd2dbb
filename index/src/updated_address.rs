//! Updated address → transactions that touched it.

use std::sync::Arc;

use explorer_store::{Collection, DocumentStore, Order, Page};
use explorer_types::{Address, TxId};

use crate::address::AddressReferenceIndex;
use crate::{AddressTxReference, IndexError};

/// Reference index over the `updated_address_ref` collection.
///
/// Entries are ordered by the originating transaction's nonce. Transactions of
/// different signers interleave, so an address's sequence need not be dense.
#[derive(Clone)]
pub struct UpdatedAddressReferenceIndex {
    inner: AddressReferenceIndex,
}

impl UpdatedAddressReferenceIndex {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: AddressReferenceIndex::new(store, Collection::UpdatedAddressReferences),
        }
    }

    pub fn record_updated_address_reference(
        &self,
        tx_id: &TxId,
        nonce: u64,
        address: &Address,
    ) -> Result<(), IndexError> {
        self.inner.record(tx_id, nonce, address)
    }

    pub fn query_updated_address_references(
        &self,
        address: &Address,
        order: Order,
        page: Page,
    ) -> Result<Vec<TxId>, IndexError> {
        self.inner.tx_ids(address, order, page)
    }

    pub fn updated_address_references(
        &self,
        address: &Address,
        order: Order,
        page: Page,
    ) -> Result<Vec<AddressTxReference>, IndexError> {
        self.inner.references(address, order, page)
    }

    pub fn len(&self) -> Result<u64, IndexError> {
        self.inner.len()
    }

    pub fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_store::MemoryDocumentStore;

    #[test]
    fn interleaves_signers_by_nonce() {
        let index = UpdatedAddressReferenceIndex::new(Arc::new(MemoryDocumentStore::new()));
        let touched = Address::new([0xcc; 20]);
        index
            .record_updated_address_reference(&TxId::new([1; 32]), 7, &touched)
            .unwrap();
        index
            .record_updated_address_reference(&TxId::new([2; 32]), 3, &touched)
            .unwrap();

        let refs = index
            .updated_address_references(&touched, Order::Ascending, Page::ALL)
            .unwrap();
        let seen: Vec<(u64, TxId)> = refs.iter().map(|r| (r.tx_nonce, r.tx_id)).collect();
        assert_eq!(seen, vec![(3, TxId::new([2; 32])), (7, TxId::new([1; 32]))]);
    }

    #[test]
    fn offset_past_end_is_empty() {
        let index = UpdatedAddressReferenceIndex::new(Arc::new(MemoryDocumentStore::new()));
        let touched = Address::new([0x0c; 20]);
        index
            .record_updated_address_reference(&TxId::new([1; 32]), 0, &touched)
            .unwrap();
        assert!(index
            .query_updated_address_references(&touched, Order::Ascending, Page::new(5, 10))
            .unwrap()
            .is_empty());
    }
}
