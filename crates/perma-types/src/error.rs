use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid base58 string: {0}")]
    InvalidBase58(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unsupported multihash header {code:#04x}/{len}")]
    UnsupportedMultihash { code: u8, len: u8 },

    #[error("malformed index entry: {0}")]
    MalformedEntry(String),

    #[error("timestamp {0} predates the protocol epoch")]
    BeforeEpoch(u64),
}
