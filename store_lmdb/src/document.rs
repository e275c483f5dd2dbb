//! LMDB implementation of the index storage port.
//!
//! Every collection maps to two databases:
//! - `<name>`: primary key → ordering key. Lets an upsert find and drop the
//!   ordering entry of the document it replaces.
//! - `<name>_order`: ordering key → encoded body. Scans walk this database,
//!   so a prefix range over it is an ordered, windowed query.
//!
//! Bodies carry a one-byte codec tag so compression can be switched on or off
//! between runs without rewriting existing documents.

use std::collections::HashMap;
use std::ops::Bound;
use std::path::Path;
use std::sync::RwLock;

use heed::types::Bytes;
use heed::Database;

use explorer_store::scan::prefix_bounds;
use explorer_store::{
    Collection, DocumentStore, IndexedDocument, Order, Page, StoreError,
};

use crate::environment::{EnvSettings, LmdbEnvironment};
use crate::integrity::{check_integrity, IntegrityReport};
use crate::{IndexStoreConfig, LmdbError, LockingMode};

const CODEC_RAW: u8 = 0;
const CODEC_ZSTD: u8 = 1;
const ZSTD_LEVEL: i32 = 3;

/// Two databases per collection plus headroom.
const MAX_DBS: u32 = 8;

#[derive(Clone, Copy)]
struct CollectionDbs {
    primary: Database<Bytes, Bytes>,
    ordered: Database<Bytes, Bytes>,
}

pub struct LmdbDocumentStore {
    environment: LmdbEnvironment,
    compress: bool,
    collections: RwLock<HashMap<Collection, CollectionDbs>>,
}

fn poisoned<T>(_: T) -> LmdbError {
    LmdbError::Heed("collection cache lock poisoned".to_string())
}

fn borrow_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(key) => Bound::Included(key.as_slice()),
        Bound::Excluded(key) => Bound::Excluded(key.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

impl LmdbDocumentStore {
    /// Open or create the index environment in the directory `path`.
    pub fn open(path: &Path, config: &IndexStoreConfig) -> Result<Self, LmdbError> {
        let environment = LmdbEnvironment::open(
            path,
            EnvSettings {
                map_size: config.map_size(),
                max_dbs: MAX_DBS,
                flags: config.env_flags(),
                exclusive: config.locking == LockingMode::Exclusive,
            },
        )?;
        tracing::info!(
            path = %path.display(),
            read_only = config.read_only,
            compress = config.compress,
            locking = ?config.locking,
            "opened index store"
        );
        Ok(Self {
            environment,
            compress: config.compress,
            collections: RwLock::new(HashMap::new()),
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.environment.is_read_only()
    }

    /// Count entries in every index database.
    pub fn integrity_report(&self) -> Result<IntegrityReport, LmdbError> {
        let names: Vec<&str> = Collection::ALL
            .iter()
            .flat_map(|c| [c.name(), c.ordering_name()])
            .collect();
        check_integrity(self.environment.env(), &names)
    }

    /// Database handles for `collection`, creating them when writable.
    fn collection_dbs(&self, collection: Collection) -> Result<Option<CollectionDbs>, LmdbError> {
        if let Some(dbs) = self.collections.read().map_err(poisoned)?.get(&collection) {
            return Ok(Some(*dbs));
        }

        let mut cache = self.collections.write().map_err(poisoned)?;
        if let Some(dbs) = cache.get(&collection) {
            return Ok(Some(*dbs));
        }
        let primary = self.environment.database(collection.name())?;
        let ordered = self.environment.database(collection.ordering_name())?;
        match (primary, ordered) {
            (Some(primary), Some(ordered)) => {
                let dbs = CollectionDbs { primary, ordered };
                cache.insert(collection, dbs);
                tracing::debug!(collection = collection.name(), "collection ready");
                Ok(Some(dbs))
            }
            // Read-only and the writer has not created it yet; retry next call.
            _ => Ok(None),
        }
    }

    fn encode_body(&self, body: &[u8]) -> Result<Vec<u8>, LmdbError> {
        if self.compress {
            let compressed = zstd::encode_all(body, ZSTD_LEVEL)
                .map_err(|e| LmdbError::Compression(e.to_string()))?;
            let mut out = Vec::with_capacity(compressed.len() + 1);
            out.push(CODEC_ZSTD);
            out.extend_from_slice(&compressed);
            Ok(out)
        } else {
            let mut out = Vec::with_capacity(body.len() + 1);
            out.push(CODEC_RAW);
            out.extend_from_slice(body);
            Ok(out)
        }
    }

    fn decode_body(stored: &[u8]) -> Result<Vec<u8>, LmdbError> {
        match stored.split_first() {
            Some((&CODEC_RAW, body)) => Ok(body.to_vec()),
            Some((&CODEC_ZSTD, body)) => {
                zstd::decode_all(body).map_err(|e| LmdbError::Compression(e.to_string()))
            }
            Some((tag, _)) => Err(LmdbError::Serialization(format!(
                "unknown document codec tag {tag}"
            ))),
            None => Err(LmdbError::Serialization("empty document".to_string())),
        }
    }
}

fn collect_window<'txn, I>(iter: I, page: Page) -> Result<Vec<Vec<u8>>, LmdbError>
where
    I: Iterator<Item = heed::Result<(&'txn [u8], &'txn [u8])>>,
{
    let mut bodies = Vec::new();
    for item in page.apply(iter) {
        let (_key, stored) = item.map_err(LmdbError::from)?;
        bodies.push(LmdbDocumentStore::decode_body(stored)?);
    }
    Ok(bodies)
}

impl DocumentStore for LmdbDocumentStore {
    fn ensure_collection(&self, collection: Collection) -> Result<(), StoreError> {
        if self.is_read_only() {
            return Err(StoreError::ReadOnly);
        }
        self.collection_dbs(collection)?;
        Ok(())
    }

    fn upsert(&self, collection: Collection, doc: IndexedDocument<'_>) -> Result<(), StoreError> {
        if self.is_read_only() {
            return Err(StoreError::ReadOnly);
        }
        let dbs = self.collection_dbs(collection)?.ok_or_else(|| {
            StoreError::Backend(format!("collection {} unavailable", collection.name()))
        })?;
        let body = self.encode_body(doc.body)?;

        let mut wtxn = self.environment.env().write_txn().map_err(LmdbError::from)?;
        let previous = dbs
            .primary
            .get(&wtxn, doc.primary_key)
            .map_err(LmdbError::from)?
            .map(|key| key.to_vec());
        if let Some(previous) = previous {
            if previous != doc.ordering_key {
                dbs.ordered
                    .delete(&mut wtxn, &previous)
                    .map_err(LmdbError::from)?;
            }
        }
        dbs.primary
            .put(&mut wtxn, doc.primary_key, doc.ordering_key)
            .map_err(LmdbError::from)?;
        dbs.ordered
            .put(&mut wtxn, doc.ordering_key, &body)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get(&self, collection: Collection, primary_key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(dbs) = self.collection_dbs(collection)? else {
            return Ok(None);
        };
        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        let Some(ordering_key) = dbs.primary.get(&rtxn, primary_key).map_err(LmdbError::from)? else {
            return Ok(None);
        };
        let stored = dbs
            .ordered
            .get(&rtxn, ordering_key)
            .map_err(LmdbError::from)?
            .ok_or_else(|| {
                LmdbError::Serialization(format!(
                    "{}: primary entry without ordering entry",
                    collection.name()
                ))
            })?;
        Ok(Some(Self::decode_body(stored)?))
    }

    fn scan(
        &self,
        collection: Collection,
        prefix: &[u8],
        order: Order,
        page: Page,
    ) -> Result<Vec<Vec<u8>>, StoreError> {
        let Some(dbs) = self.collection_dbs(collection)? else {
            return Ok(Vec::new());
        };
        let (lower, upper) = prefix_bounds(prefix);
        let bounds = (borrow_bound(&lower), borrow_bound(&upper));

        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        let bodies = match order {
            Order::Ascending => {
                let iter = dbs.ordered.range(&rtxn, &bounds).map_err(LmdbError::from)?;
                collect_window(iter, page)?
            }
            Order::Descending => {
                let iter = dbs
                    .ordered
                    .rev_range(&rtxn, &bounds)
                    .map_err(LmdbError::from)?;
                collect_window(iter, page)?
            }
        };
        Ok(bodies)
    }

    fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let Some(dbs) = self.collection_dbs(collection)? else {
            return Ok(0);
        };
        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        let count = dbs.primary.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
