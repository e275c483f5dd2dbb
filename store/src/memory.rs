//! In-memory implementation of the storage port.
//!
//! Selected when the index store is configured without a path; also the
//! default backend for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::scan::prefix_bounds;
use crate::{Collection, DocumentStore, IndexedDocument, Order, Page, StoreError};

#[derive(Default)]
struct MemoryCollection {
    /// primary key → ordering key
    primary: HashMap<Vec<u8>, Vec<u8>>,
    /// ordering key → body
    ordered: BTreeMap<Vec<u8>, Vec<u8>>,
}

/// Thread-safe, non-durable [`DocumentStore`].
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, MemoryCollection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("memory store lock poisoned".to_string())
}

impl DocumentStore for MemoryDocumentStore {
    fn ensure_collection(&self, collection: Collection) -> Result<(), StoreError> {
        self.collections
            .write()
            .map_err(poisoned)?
            .entry(collection)
            .or_default();
        Ok(())
    }

    fn upsert(&self, collection: Collection, doc: IndexedDocument<'_>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let coll = collections.entry(collection).or_default();
        if let Some(previous) = coll
            .primary
            .insert(doc.primary_key.to_vec(), doc.ordering_key.to_vec())
        {
            if previous != doc.ordering_key {
                coll.ordered.remove(&previous);
            }
        }
        coll.ordered
            .insert(doc.ordering_key.to_vec(), doc.body.to_vec());
        Ok(())
    }

    fn get(&self, collection: Collection, primary_key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let collections = self.collections.read().map_err(poisoned)?;
        let Some(coll) = collections.get(&collection) else {
            return Ok(None);
        };
        Ok(coll
            .primary
            .get(primary_key)
            .and_then(|ordering_key| coll.ordered.get(ordering_key))
            .cloned())
    }

    fn scan(
        &self,
        collection: Collection,
        prefix: &[u8],
        order: Order,
        page: Page,
    ) -> Result<Vec<Vec<u8>>, StoreError> {
        let collections = self.collections.read().map_err(poisoned)?;
        let Some(coll) = collections.get(&collection) else {
            return Ok(Vec::new());
        };
        let range = coll.ordered.range::<Vec<u8>, _>(prefix_bounds(prefix));
        let bodies = match order {
            Order::Ascending => page.apply(range).map(|(_, v)| v.clone()).collect(),
            Order::Descending => page.apply(range.rev()).map(|(_, v)| v.clone()).collect(),
        };
        Ok(bodies)
    }

    fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(&collection)
            .map(|c| c.primary.len() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(store: &MemoryDocumentStore, primary: &[u8], ordering: &[u8], body: &[u8]) {
        store
            .upsert(
                Collection::TxReferences,
                IndexedDocument {
                    primary_key: primary,
                    ordering_key: ordering,
                    body,
                },
            )
            .unwrap();
    }

    #[test]
    fn upsert_replaces_ordering_entry() {
        let store = MemoryDocumentStore::new();
        put(&store, b"tx", b"1tx", b"first");
        put(&store, b"tx", b"2tx", b"second");

        assert_eq!(store.count(Collection::TxReferences).unwrap(), 1);
        let all = store
            .scan(Collection::TxReferences, &[], Order::Ascending, Page::ALL)
            .unwrap();
        assert_eq!(all, vec![b"second".to_vec()]);
        assert_eq!(
            store.get(Collection::TxReferences, b"tx").unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[test]
    fn scan_respects_prefix_order_and_window() {
        let store = MemoryDocumentStore::new();
        for (k, v) in [(b"a1", b"x"), (b"a2", b"y"), (b"a3", b"z"), (b"b1", b"w")] {
            put(&store, k, k, v);
        }
        let asc = store
            .scan(Collection::TxReferences, b"a", Order::Ascending, Page::new(1, 5))
            .unwrap();
        assert_eq!(asc, vec![b"y".to_vec(), b"z".to_vec()]);
        let desc = store
            .scan(Collection::TxReferences, b"a", Order::Descending, Page::new(0, 2))
            .unwrap();
        assert_eq!(desc, vec![b"z".to_vec(), b"y".to_vec()]);
    }

    #[test]
    fn missing_collection_scans_empty() {
        let store = MemoryDocumentStore::new();
        let out = store
            .scan(Collection::SignerReferences, b"x", Order::Ascending, Page::ALL)
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(store.get(Collection::SignerReferences, b"x").unwrap(), None);
    }
}
