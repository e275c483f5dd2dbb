//! Nullable storage port with switchable failures.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use explorer_store::{
    Collection, DocumentStore, IndexedDocument, MemoryDocumentStore, Order, Page, StoreError,
};

/// In-memory [`DocumentStore`] that can be made to fail reads or writes.
pub struct NullDocumentStore {
    inner: MemoryDocumentStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    upserts: AtomicU64,
}

impl NullDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            upserts: AtomicU64::new(0),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful upserts so far.
    pub fn upsert_count(&self) -> u64 {
        self.upserts.load(Ordering::SeqCst)
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null document store write failure".into()));
        }
        Ok(())
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null document store read failure".into()));
        }
        Ok(())
    }
}

impl Default for NullDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for NullDocumentStore {
    fn ensure_collection(&self, collection: Collection) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.ensure_collection(collection)
    }

    fn upsert(&self, collection: Collection, doc: IndexedDocument<'_>) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.upsert(collection, doc)?;
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, collection: Collection, primary_key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_reads()?;
        self.inner.get(collection, primary_key)
    }

    fn scan(
        &self,
        collection: Collection,
        prefix: &[u8],
        order: Order,
        page: Page,
    ) -> Result<Vec<Vec<u8>>, StoreError> {
        self.check_reads()?;
        self.inner.scan(collection, prefix, order, page)
    }

    fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        self.check_reads()?;
        self.inner.count(collection)
    }
}
