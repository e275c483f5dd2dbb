//! Choosing which chain the daemon serves.

use thiserror::Error;

use explorer_types::ChainId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainSelectionError {
    #[error("{0:?} is not a valid chain id (expected a UUID)")]
    Invalid(String),

    #[error("the store holds no chains; pass --chain-id explicitly")]
    NoChains,

    #[error("the store holds {0} chains; pass --chain-id to choose one")]
    Ambiguous(usize),
}

/// Resolve the chain to serve.
///
/// An explicit id is taken as is. Without one, the store must hold exactly
/// one chain.
pub fn select_chain(
    requested: Option<&str>,
    available: &[ChainId],
) -> Result<ChainId, ChainSelectionError> {
    if let Some(requested) = requested {
        return requested
            .parse()
            .map_err(|_| ChainSelectionError::Invalid(requested.to_string()));
    }
    match available {
        [only] => Ok(*only),
        [] => Err(ChainSelectionError::NoChains),
        many => Err(ChainSelectionError::Ambiguous(many.len())),
    }
}
