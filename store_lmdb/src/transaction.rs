//! LMDB implementation of TransactionStore.

use explorer_store::transaction::TransactionStore;
use explorer_store::StoreError;
use explorer_types::{Transaction, TxId};

use crate::{LmdbBaseStore, LmdbError};

impl TransactionStore for LmdbBaseStore {
    fn put_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        let mut wtxn = self.write_txn()?;
        self.put_transaction_in(&mut wtxn, tx)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_transaction(&self, id: &TxId) -> Result<Option<Transaction>, StoreError> {
        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        match self
            .transactions_db
            .get(&rtxn, id.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn transaction_ids(&self) -> Result<Vec<TxId>, StoreError> {
        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        let mut ids = Vec::new();
        for result in self.transactions_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, _) = result.map_err(LmdbError::from)?;
            let arr: [u8; 32] = key.try_into().map_err(|_| {
                StoreError::Corruption("transaction key is not 32 bytes".to_string())
            })?;
            ids.push(TxId::new(arr));
        }
        Ok(ids)
    }
}
