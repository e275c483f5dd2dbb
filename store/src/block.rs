//! Block storage trait.

use crate::StoreError;
use explorer_types::{Block, BlockHash, ChainId};

/// Trait for the base store's block persistence.
pub trait BlockStore {
    /// Persist a block together with its embedded transactions.
    ///
    /// Re-putting an identical block is a no-op; a different body under an
    /// existing hash is rejected with [`StoreError::Duplicate`].
    fn put_block(&self, block: &Block) -> Result<(), StoreError>;

    /// Retrieve a block by hash.
    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError>;

    /// Hashes of every stored block, in no particular order.
    fn block_hashes(&self) -> Result<Vec<BlockHash>, StoreError>;

    /// Every chain that has at least one stored block.
    fn chain_ids(&self) -> Result<Vec<ChainId>, StoreError>;

    /// Total number of blocks in the store.
    fn block_count(&self) -> Result<u64, StoreError>;
}
