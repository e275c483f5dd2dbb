//! Errors raised while parsing identifiers from text.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("invalid {kind}: expected {expected} hex digits, got {actual}")]
    Length {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid {kind}: {value:?} is not hexadecimal")]
    NotHex { kind: &'static str, value: String },

    #[error("invalid chain id: {0}")]
    ChainId(String),
}
