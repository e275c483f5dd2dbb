//! The two record shapes persisted by the reference indices, and their keys.
//!
//! Key layouts (all integers big-endian so byte order equals numeric order):
//! - forward reference: primary `tx_id(32)`, ordering `height(8) ++ tx_id(32)`;
//! - address reference: `address_hex(40) ++ nonce(8) ++ tx_id(32)` for both
//!   primary and ordering key. The address part is the lowercase hex string,
//!   which is what makes lookups case-insensitive.

use serde::{Deserialize, Serialize};

use explorer_types::{Address, BlockHash, TxId};

use crate::IndexError;

/// "This transaction was last observed in this block at this height."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBlockReference {
    pub tx_id: TxId,
    pub block_hash: BlockHash,
    pub block_height: u64,
}

impl TxBlockReference {
    pub fn primary_key(&self) -> [u8; 32] {
        *self.tx_id.as_bytes()
    }

    pub fn ordering_key(&self) -> [u8; 40] {
        let mut key = [0u8; 40];
        key[..8].copy_from_slice(&self.block_height.to_be_bytes());
        key[8..].copy_from_slice(self.tx_id.as_bytes());
        key
    }

    pub fn encode(&self) -> Result<Vec<u8>, IndexError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, IndexError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// "This address is related to this transaction, issued at this nonce."
///
/// Used by both the signer and the updated-address collections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressTxReference {
    pub address: Address,
    pub tx_nonce: u64,
    pub tx_id: TxId,
}

/// Length of the normalized address prefix of an address reference key.
pub const ADDRESS_PREFIX_LEN: usize = Address::LEN * 2;

/// Normalized (lowercase hex) address bytes every address key starts with.
pub fn address_prefix(address: &Address) -> Vec<u8> {
    address.to_hex().into_bytes()
}

impl AddressTxReference {
    pub fn key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(ADDRESS_PREFIX_LEN + 8 + 32);
        key.extend_from_slice(&address_prefix(&self.address));
        key.extend_from_slice(&self.tx_nonce.to_be_bytes());
        key.extend_from_slice(self.tx_id.as_bytes());
        key
    }

    pub fn encode(&self) -> Result<Vec<u8>, IndexError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, IndexError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
