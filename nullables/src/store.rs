//! Nullable base store: thread-safe in-memory blocks and transactions.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use explorer_store::{BlockStore, StoreError, TransactionStore};
use explorer_types::{Block, BlockHash, ChainId, Transaction, TxId};

/// An in-memory block + transaction store for testing.
///
/// Follows the same duplicate rules as the LMDB base store: an identical
/// re-put is accepted, a different body under an existing key is rejected.
pub struct NullBaseStore {
    blocks: Mutex<HashMap<BlockHash, Block>>,
    transactions: Mutex<HashMap<TxId, Transaction>>,
    chains: Mutex<HashSet<ChainId>>,
    fail_writes: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
}

impl NullBaseStore {
    pub fn new() -> Self {
        Self {
            blocks: Mutex::new(HashMap::new()),
            transactions: Mutex::new(HashMap::new()),
            chains: Mutex::new(HashSet::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail with [`StoreError::Backend`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null base store write failure".into()));
        }
        Ok(())
    }

    fn insert_transaction(
        transactions: &mut HashMap<TxId, Transaction>,
        tx: &Transaction,
    ) -> Result<(), StoreError> {
        match transactions.get(&tx.id) {
            Some(existing) if existing == tx => Ok(()),
            Some(_) => Err(StoreError::Duplicate(format!("transaction {}", tx.id))),
            None => {
                transactions.insert(tx.id, tx.clone());
                Ok(())
            }
        }
    }
}

impl Default for NullBaseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for NullBaseStore {
    fn put_block(&self, block: &Block) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut blocks = lock(&self.blocks)?;
        match blocks.get(&block.hash) {
            Some(existing) if existing == block => return Ok(()),
            Some(_) => return Err(StoreError::Duplicate(format!("block {}", block.hash))),
            None => {}
        }

        let mut transactions = lock(&self.transactions)?;
        let mut staged = transactions.clone();
        for tx in &block.transactions {
            Self::insert_transaction(&mut staged, tx)?;
        }
        *transactions = staged;
        blocks.insert(block.hash, block.clone());
        lock(&self.chains)?.insert(block.chain_id);
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        Ok(lock(&self.blocks)?.get(hash).cloned())
    }

    fn block_hashes(&self) -> Result<Vec<BlockHash>, StoreError> {
        Ok(lock(&self.blocks)?.keys().copied().collect())
    }

    fn chain_ids(&self) -> Result<Vec<ChainId>, StoreError> {
        Ok(lock(&self.chains)?.iter().copied().collect())
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.blocks)?.len() as u64)
    }
}

impl TransactionStore for NullBaseStore {
    fn put_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        self.check_writable()?;
        Self::insert_transaction(&mut *lock(&self.transactions)?, tx)
    }

    fn get_transaction(&self, id: &TxId) -> Result<Option<Transaction>, StoreError> {
        Ok(lock(&self.transactions)?.get(id).cloned())
    }

    fn transaction_ids(&self) -> Result<Vec<TxId>, StoreError> {
        Ok(lock(&self.transactions)?.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_types::Address;

    fn tx(n: u8) -> Transaction {
        Transaction::new(TxId::new([n; 32]), n as u64, Address::new([n; 20]), [])
    }

    fn block(n: u8, txs: Vec<Transaction>) -> Block {
        Block {
            hash: BlockHash::new([n; 32]),
            height: n as u64,
            chain_id: ChainId::from_bytes([1; 16]),
            transactions: txs,
        }
    }

    #[test]
    fn put_block_stores_embedded_transactions() {
        let store = NullBaseStore::new();
        store.put_block(&block(1, vec![tx(1), tx(2)])).unwrap();
        assert!(store.get_transaction(&TxId::new([2; 32])).unwrap().is_some());
        assert_eq!(store.chain_ids().unwrap(), vec![ChainId::from_bytes([1; 16])]);
        assert_eq!(store.block_count().unwrap(), 1);
    }

    #[test]
    fn identical_re_put_is_accepted() {
        let store = NullBaseStore::new();
        store.put_transaction(&tx(1)).unwrap();
        store.put_transaction(&tx(1)).unwrap();
        assert_eq!(store.transaction_ids().unwrap().len(), 1);
    }

    #[test]
    fn conflicting_body_is_duplicate() {
        let store = NullBaseStore::new();
        store.put_block(&block(1, vec![])).unwrap();
        let mut other = block(1, vec![]);
        other.height = 99;
        assert!(matches!(
            store.put_block(&other),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn failing_writes_persist_nothing() {
        let store = NullBaseStore::new();
        store.set_fail_writes(true);
        assert!(store.put_block(&block(1, vec![tx(1)])).is_err());
        assert_eq!(store.block_count().unwrap(), 0);
        assert!(store.transaction_ids().unwrap().is_empty());
    }
}
