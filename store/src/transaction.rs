//! Transaction storage trait.

use crate::StoreError;
use explorer_types::{Transaction, TxId};

/// Trait for the base store's transaction persistence.
pub trait TransactionStore {
    /// Persist a transaction keyed by its id. Same duplicate rules as
    /// [`crate::BlockStore::put_block`].
    fn put_transaction(&self, tx: &Transaction) -> Result<(), StoreError>;

    /// Retrieve a transaction by id.
    fn get_transaction(&self, id: &TxId) -> Result<Option<Transaction>, StoreError>;

    /// Ids of every stored transaction, in no particular order.
    fn transaction_ids(&self) -> Result<Vec<TxId>, StoreError>;
}
