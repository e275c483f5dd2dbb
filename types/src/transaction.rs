//! Transaction shape the indices consume.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{Address, TxId};

/// A signed transaction as persisted by the base store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    /// Per-signer sequence number; strictly increasing for one signer.
    pub nonce: u64,
    pub signer: Address,
    /// Every address whose state the transaction's execution touched.
    /// May include the signer.
    pub updated_addresses: BTreeSet<Address>,
}

impl Transaction {
    pub fn new(
        id: TxId,
        nonce: u64,
        signer: Address,
        updated_addresses: impl IntoIterator<Item = Address>,
    ) -> Self {
        Self {
            id,
            nonce,
            signer,
            updated_addresses: updated_addresses.into_iter().collect(),
        }
    }
}
