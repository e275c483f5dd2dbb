//! The indexed store: a base store with reference indices kept in step.
//!
//! Writes go to the base store first. Only after the base write succeeded are
//! the references derived and recorded, so an index never points at something
//! the base store does not hold. Reads are served from the indices alone.

use std::sync::Arc;

use tracing::{debug, info, warn};

use explorer_store::{BaseStore, DocumentStore, Order, Page};
use explorer_types::{Address, Block, BlockHash, Transaction, TxId};

use crate::{
    ForwardReferenceIndex, IndexError, IndexedStoreError, SignerReferenceIndex,
    UpdatedAddressReferenceIndex,
};

const REBUILD_LOG_INTERVAL: u64 = 10_000;

/// Outcome of [`IndexedStore::rebuild`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub blocks: u64,
    pub transactions: u64,
}

/// Document counts per reference collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexCounts {
    pub tx_references: u64,
    pub signer_references: u64,
    pub updated_address_references: u64,
}

pub struct IndexedStore {
    base: Arc<dyn BaseStore>,
    forward: ForwardReferenceIndex,
    signers: SignerReferenceIndex,
    updated_addresses: UpdatedAddressReferenceIndex,
}

impl IndexedStore {
    pub fn new(base: Arc<dyn BaseStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            base,
            forward: ForwardReferenceIndex::new(Arc::clone(&documents)),
            signers: SignerReferenceIndex::new(Arc::clone(&documents)),
            updated_addresses: UpdatedAddressReferenceIndex::new(documents),
        }
    }

    pub fn base(&self) -> &Arc<dyn BaseStore> {
        &self.base
    }

    pub fn forward(&self) -> &ForwardReferenceIndex {
        &self.forward
    }

    pub fn signers(&self) -> &SignerReferenceIndex {
        &self.signers
    }

    pub fn updated_addresses(&self) -> &UpdatedAddressReferenceIndex {
        &self.updated_addresses
    }

    /// Persist a block, then index each of its transactions.
    ///
    /// Embedded transactions are persisted by the base store as part of the
    /// block, so they get signer and updated-address references here too.
    pub fn put_block(&self, block: &Block) -> Result<(), IndexedStoreError> {
        self.base
            .put_block(block)
            .map_err(IndexedStoreError::BaseWrite)?;

        self.index_block(block)
            .map_err(|source| IndexedStoreError::IndexWrite {
                subject: format!("block {}", block.hash),
                source,
            })?;

        debug!(
            block = %block.hash,
            height = block.height,
            txs = block.transactions.len(),
            "indexed block"
        );
        Ok(())
    }

    /// Persist a standalone transaction, then index its signer and every
    /// address it updated.
    pub fn put_transaction(&self, tx: &Transaction) -> Result<(), IndexedStoreError> {
        self.base
            .put_transaction(tx)
            .map_err(IndexedStoreError::BaseWrite)?;

        self.index_transaction(tx)
            .map_err(|source| IndexedStoreError::IndexWrite {
                subject: format!("transaction {}", tx.id),
                source,
            })?;

        debug!(tx = %tx.id, signer = %tx.signer, nonce = tx.nonce, "indexed transaction");
        Ok(())
    }

    fn index_block(&self, block: &Block) -> Result<(), IndexError> {
        for tx in &block.transactions {
            self.forward
                .record_reference(&tx.id, &block.hash, block.height)?;
            self.index_transaction(tx)?;
        }
        Ok(())
    }

    fn index_transaction(&self, tx: &Transaction) -> Result<(), IndexError> {
        self.signers
            .record_signer_reference(&tx.id, tx.nonce, &tx.signer)?;
        for address in &tx.updated_addresses {
            self.updated_addresses
                .record_updated_address_reference(&tx.id, tx.nonce, address)?;
        }
        Ok(())
    }

    pub fn tx_references(
        &self,
        tx_id: Option<&TxId>,
        order: Order,
        page: Page,
    ) -> Result<Vec<(TxId, BlockHash)>, IndexError> {
        self.forward.query_references(tx_id, order, page)
    }

    pub fn block_of(&self, tx_id: &TxId) -> Result<Option<BlockHash>, IndexError> {
        self.forward.block_of(tx_id)
    }

    pub fn signer_references(
        &self,
        signer: &Address,
        order: Order,
        page: Page,
    ) -> Result<Vec<TxId>, IndexError> {
        self.signers.query_signer_references(signer, order, page)
    }

    pub fn updated_address_references(
        &self,
        address: &Address,
        order: Order,
        page: Page,
    ) -> Result<Vec<TxId>, IndexError> {
        self.updated_addresses
            .query_updated_address_references(address, order, page)
    }

    pub fn index_counts(&self) -> Result<IndexCounts, IndexError> {
        Ok(IndexCounts {
            tx_references: self.forward.len()?,
            signer_references: self.signers.len()?,
            updated_address_references: self.updated_addresses.len()?,
        })
    }

    /// Re-derive every reference from the base store.
    ///
    /// Blocks are replayed by ascending height, so when several stored blocks
    /// claim one transaction the highest one ends up referenced. Standalone
    /// transactions are replayed afterwards. Existing references are
    /// overwritten in place, never cleared first.
    pub fn rebuild(&self) -> Result<RebuildReport, IndexedStoreError> {
        let mut heights = Vec::new();
        for hash in self.base.block_hashes().map_err(IndexedStoreError::BaseRead)? {
            match self.base.get_block(&hash).map_err(IndexedStoreError::BaseRead)? {
                Some(block) => heights.push((block.height, hash)),
                None => warn!(block = %hash, "listed block vanished during rebuild"),
            }
        }
        heights.sort_unstable();
        info!(blocks = heights.len(), "rebuilding reference indices");

        let mut report = RebuildReport::default();
        for (_, hash) in heights {
            let Some(block) = self.base.get_block(&hash).map_err(IndexedStoreError::BaseRead)? else {
                continue;
            };
            self.index_block(&block)
                .map_err(|source| IndexedStoreError::IndexWrite {
                    subject: format!("block {}", block.hash),
                    source,
                })?;
            report.blocks += 1;
            if report.blocks % REBUILD_LOG_INTERVAL == 0 {
                info!(blocks = report.blocks, height = block.height, "rebuild progress");
            }
        }

        for id in self
            .base
            .transaction_ids()
            .map_err(IndexedStoreError::BaseRead)?
        {
            let Some(tx) = self.base.get_transaction(&id).map_err(IndexedStoreError::BaseRead)? else {
                warn!(tx = %id, "listed transaction vanished during rebuild");
                continue;
            };
            self.index_transaction(&tx)
                .map_err(|source| IndexedStoreError::IndexWrite {
                    subject: format!("transaction {}", tx.id),
                    source,
                })?;
            report.transactions += 1;
        }

        info!(
            blocks = report.blocks,
            transactions = report.transactions,
            "reference indices rebuilt"
        );
        Ok(report)
    }
}
