//! Transaction → containing block.

use std::sync::Arc;

use tracing::trace;

use explorer_store::{Collection, DocumentStore, IndexedDocument, Order, Page};
use explorer_types::{BlockHash, TxId};

use crate::{IndexError, TxBlockReference};

/// Forward reference index over the `block_ref` collection.
///
/// Holds at most one reference per transaction: recording a transaction again
/// under another block replaces the previous reference.
#[derive(Clone)]
pub struct ForwardReferenceIndex {
    store: Arc<dyn DocumentStore>,
}

impl ForwardReferenceIndex {
    const COLLECTION: Collection = Collection::TxReferences;

    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Record that `tx_id` was seen in `block_hash` at `block_height`.
    pub fn record_reference(
        &self,
        tx_id: &TxId,
        block_hash: &BlockHash,
        block_height: u64,
    ) -> Result<(), IndexError> {
        self.store.ensure_collection(Self::COLLECTION)?;

        let reference = TxBlockReference {
            tx_id: *tx_id,
            block_hash: *block_hash,
            block_height,
        };
        let body = reference.encode()?;
        self.store.upsert(
            Self::COLLECTION,
            IndexedDocument {
                primary_key: &reference.primary_key(),
                ordering_key: &reference.ordering_key(),
                body: &body,
            },
        )?;

        trace!(tx = %tx_id, block = %block_hash, height = block_height, "recorded forward reference");
        Ok(())
    }

    /// Forward references ordered by block height (then tx id).
    ///
    /// With `tx_id` set, the result holds at most that one transaction's
    /// reference, still windowed by `page`.
    pub fn query_references(
        &self,
        tx_id: Option<&TxId>,
        order: Order,
        page: Page,
    ) -> Result<Vec<(TxId, BlockHash)>, IndexError> {
        let references: Vec<TxBlockReference> = match tx_id {
            Some(tx_id) => {
                let found = self
                    .store
                    .get(Self::COLLECTION, tx_id.as_bytes())?
                    .map(|body| TxBlockReference::decode(&body))
                    .transpose()?;
                page.apply(found.into_iter()).collect()
            }
            None => self
                .store
                .scan(Self::COLLECTION, &[], order, page)?
                .iter()
                .map(|body| TxBlockReference::decode(body))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(references
            .into_iter()
            .map(|r| (r.tx_id, r.block_hash))
            .collect())
    }

    /// The block currently referenced for `tx_id`, if any.
    pub fn block_of(&self, tx_id: &TxId) -> Result<Option<BlockHash>, IndexError> {
        Ok(self
            .query_references(Some(tx_id), Order::Ascending, Page::ALL)?
            .into_iter()
            .next()
            .map(|(_, block)| block))
    }

    /// Number of transactions with a forward reference.
    pub fn len(&self) -> Result<u64, IndexError> {
        Ok(self.store.count(Self::COLLECTION)?)
    }

    pub fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_store::MemoryDocumentStore;

    fn index() -> ForwardReferenceIndex {
        ForwardReferenceIndex::new(Arc::new(MemoryDocumentStore::new()))
    }

    fn tx(n: u8) -> TxId {
        TxId::new([n; 32])
    }

    fn block(n: u8) -> BlockHash {
        BlockHash::new([n; 32])
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = index();
        assert!(index
            .query_references(None, Order::Ascending, Page::ALL)
            .unwrap()
            .is_empty());
        assert_eq!(index.block_of(&tx(1)).unwrap(), None);
        assert!(index.is_empty().unwrap());
    }

    #[test]
    fn ordered_by_block_height() {
        let index = index();
        index.record_reference(&tx(1), &block(30), 30).unwrap();
        index.record_reference(&tx(2), &block(10), 10).unwrap();
        index.record_reference(&tx(3), &block(20), 20).unwrap();

        let asc = index
            .query_references(None, Order::Ascending, Page::ALL)
            .unwrap();
        assert_eq!(asc, vec![(tx(2), block(10)), (tx(3), block(20)), (tx(1), block(30))]);

        let desc = index
            .query_references(None, Order::Descending, Page::ALL)
            .unwrap();
        assert_eq!(desc, asc.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn last_write_wins() {
        let index = index();
        index.record_reference(&tx(1), &block(1), 1).unwrap();
        index.record_reference(&tx(1), &block(2), 2).unwrap();

        assert_eq!(index.block_of(&tx(1)).unwrap(), Some(block(2)));
        assert_eq!(index.len().unwrap(), 1);
        assert_eq!(
            index.query_references(None, Order::Ascending, Page::ALL).unwrap(),
            vec![(tx(1), block(2))]
        );
    }

    #[test]
    fn recording_twice_is_idempotent() {
        let index = index();
        index.record_reference(&tx(4), &block(4), 4).unwrap();
        index.record_reference(&tx(4), &block(4), 4).unwrap();
        assert_eq!(index.len().unwrap(), 1);
    }

    #[test]
    fn filter_by_tx_respects_page() {
        let index = index();
        index.record_reference(&tx(1), &block(1), 1).unwrap();
        index.record_reference(&tx(2), &block(2), 2).unwrap();

        let one = index
            .query_references(Some(&tx(2)), Order::Descending, Page::ALL)
            .unwrap();
        assert_eq!(one, vec![(tx(2), block(2))]);

        let skipped = index
            .query_references(Some(&tx(2)), Order::Ascending, Page::new(1, 10))
            .unwrap();
        assert!(skipped.is_empty());

        let missing = index
            .query_references(Some(&tx(9)), Order::Ascending, Page::ALL)
            .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn window_is_applied_in_order() {
        let index = index();
        for n in 1..=5u8 {
            index.record_reference(&tx(n), &block(n), n as u64).unwrap();
        }
        let window = index
            .query_references(None, Order::Descending, Page::new(1, 2))
            .unwrap();
        assert_eq!(window, vec![(tx(4), block(4)), (tx(3), block(3))]);
    }
}
