//! LMDB-backed base store for blocks and transactions.
//!
//! Three databases:
//! - `blocks`: `block_hash(32)` → bincode `Block` (transactions embedded).
//! - `transactions`: `tx_id(32)` → bincode `Transaction`.
//! - `chains`: `chain_id(16)` → empty. One entry per chain with a stored block.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, EnvFlags, RwTxn};

use explorer_store::StoreError;
use explorer_types::Transaction;

use crate::environment::{EnvSettings, LmdbEnvironment};
use crate::integrity::{check_integrity, IntegrityReport};
use crate::LmdbError;

const BASE_MAP_SIZE: usize = 1 << 30;
const MAX_DBS: u32 = 4;

pub(crate) const BASE_DATABASES: &[&str] = &["blocks", "transactions", "chains"];

pub struct LmdbBaseStore {
    pub(crate) environment: LmdbEnvironment,
    pub(crate) blocks_db: Database<Bytes, Bytes>,
    pub(crate) transactions_db: Database<Bytes, Bytes>,
    pub(crate) chains_db: Database<Bytes, Bytes>,
}

impl LmdbBaseStore {
    /// Open or create the base store in the directory `path`.
    pub fn open(path: &Path, read_only: bool) -> Result<Self, LmdbError> {
        let flags = if read_only {
            EnvFlags::READ_ONLY
        } else {
            EnvFlags::empty()
        };
        let environment = LmdbEnvironment::open(
            path,
            EnvSettings {
                map_size: BASE_MAP_SIZE,
                max_dbs: MAX_DBS,
                flags,
                exclusive: false,
            },
        )?;
        let open = |name: &str| -> Result<Database<Bytes, Bytes>, LmdbError> {
            environment
                .database(name)?
                .ok_or_else(|| LmdbError::NotFound(format!("base store database '{name}'")))
        };
        let blocks_db = open("blocks")?;
        let transactions_db = open("transactions")?;
        let chains_db = open("chains")?;
        tracing::info!(path = %path.display(), read_only, "opened base store");
        Ok(Self {
            environment,
            blocks_db,
            transactions_db,
            chains_db,
        })
    }

    pub fn integrity_report(&self) -> Result<IntegrityReport, LmdbError> {
        check_integrity(self.environment.env(), BASE_DATABASES)
    }

    pub(crate) fn write_txn(&self) -> Result<RwTxn<'_>, StoreError> {
        if self.environment.is_read_only() {
            return Err(StoreError::ReadOnly);
        }
        Ok(self.environment.env().write_txn().map_err(LmdbError::from)?)
    }

    /// Put `value` under `key` unless a different value is already there.
    ///
    /// Returns `false` when the identical value was already stored.
    pub(crate) fn put_unique(
        db: Database<Bytes, Bytes>,
        wtxn: &mut RwTxn<'_>,
        key: &[u8],
        value: &[u8],
        what: &str,
    ) -> Result<bool, StoreError> {
        let matches = db
            .get(wtxn, key)
            .map_err(LmdbError::from)?
            .map(|existing| existing == value);
        match matches {
            Some(true) => Ok(false),
            Some(false) => Err(StoreError::Duplicate(what.to_string())),
            None => {
                db.put(wtxn, key, value).map_err(LmdbError::from)?;
                Ok(true)
            }
        }
    }

    pub(crate) fn put_transaction_in(
        &self,
        wtxn: &mut RwTxn<'_>,
        tx: &Transaction,
    ) -> Result<(), StoreError> {
        let bytes = bincode::serialize(tx).map_err(LmdbError::from)?;
        Self::put_unique(
            self.transactions_db,
            wtxn,
            tx.id.as_bytes(),
            &bytes,
            &format!("transaction {}", tx.id),
        )?;
        Ok(())
    }
}
