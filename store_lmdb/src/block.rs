//! LMDB implementation of BlockStore.

use explorer_store::block::BlockStore;
use explorer_store::StoreError;
use explorer_types::{Block, BlockHash, ChainId};

use crate::{LmdbBaseStore, LmdbError};

impl BlockStore for LmdbBaseStore {
    fn put_block(&self, block: &Block) -> Result<(), StoreError> {
        let bytes = bincode::serialize(block).map_err(LmdbError::from)?;
        let mut wtxn = self.write_txn()?;
        let inserted = Self::put_unique(
            self.blocks_db,
            &mut wtxn,
            block.hash.as_bytes(),
            &bytes,
            &format!("block {}", block.hash),
        )?;
        if inserted {
            for tx in &block.transactions {
                self.put_transaction_in(&mut wtxn, tx)?;
            }
            self.chains_db
                .put(&mut wtxn, block.chain_id.as_bytes(), &[])
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(hash = %block.hash, height = block.height, inserted, "put block");
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        match self
            .blocks_db
            .get(&rtxn, hash.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn block_hashes(&self) -> Result<Vec<BlockHash>, StoreError> {
        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        let mut hashes = Vec::new();
        for result in self.blocks_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, _) = result.map_err(LmdbError::from)?;
            let arr: [u8; 32] = key
                .try_into()
                .map_err(|_| StoreError::Corruption("block key is not 32 bytes".to_string()))?;
            hashes.push(BlockHash::new(arr));
        }
        Ok(hashes)
    }

    fn chain_ids(&self) -> Result<Vec<ChainId>, StoreError> {
        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        let mut ids = Vec::new();
        for result in self.chains_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, _) = result.map_err(LmdbError::from)?;
            let arr: [u8; 16] = key
                .try_into()
                .map_err(|_| StoreError::Corruption("chain key is not 16 bytes".to_string()))?;
            ids.push(ChainId::from_bytes(arr));
        }
        Ok(ids)
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.environment.env().read_txn().map_err(LmdbError::from)?;
        let count = self.blocks_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_store::TransactionStore;
    use explorer_types::{Address, Transaction, TxId};

    fn block(seed: u8, chain_id: ChainId) -> Block {
        Block {
            hash: BlockHash::new([seed; 32]),
            height: seed as u64,
            chain_id,
            transactions: vec![Transaction::new(
                TxId::new([seed; 32]),
                0,
                Address::new([seed; 20]),
                [],
            )],
        }
    }

    #[test]
    fn put_get_block_stores_embedded_transactions() {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbBaseStore::open(dir.path(), false).unwrap();
        let chain = ChainId::random();
        let b = block(1, chain);
        store.put_block(&b).unwrap();

        assert_eq!(store.get_block(&b.hash).unwrap(), Some(b.clone()));
        assert_eq!(
            store.get_transaction(&TxId::new([1; 32])).unwrap(),
            Some(b.transactions[0].clone())
        );
        assert_eq!(store.chain_ids().unwrap(), vec![chain]);
        assert_eq!(store.block_count().unwrap(), 1);
    }

    #[test]
    fn identical_reput_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbBaseStore::open(dir.path(), false).unwrap();
        let b = block(2, ChainId::random());
        store.put_block(&b).unwrap();
        store.put_block(&b).unwrap();
        assert_eq!(store.block_hashes().unwrap(), vec![b.hash]);
    }

    #[test]
    fn conflicting_body_is_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbBaseStore::open(dir.path(), false).unwrap();
        let b = block(3, ChainId::random());
        store.put_block(&b).unwrap();
        let conflicting = Block { height: 99, ..b };
        let err = store.put_block(&conflicting).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn missing_block_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbBaseStore::open(dir.path(), false).unwrap();
        assert_eq!(store.get_block(&BlockHash::new([7; 32])).unwrap(), None);
    }
}
