use thiserror::Error;

/// Failures while encoding or decoding loader data. These are caller bugs and
/// are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("{field} value {value} does not fit into {width} bytes")]
    Overflow {
        field: &'static str,
        value: u128,
        width: usize,
    },

    #[error("seed is {len} bytes long, at most {max} are allowed")]
    InvalidSeedLength { len: usize, max: usize },

    #[error("owner ends with the program derived address marker")]
    IllegalOwner,

    #[error("unknown loader opcode {0:#04x}")]
    UnknownOpcode(u8),

    #[error("data truncated while reading {field}")]
    Truncated { field: &'static str },

    #[error("{field} is not valid utf-8")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid ether address: {0:?}")]
    InvalidEtherAddress(String),

    #[error("malformed ethereum transaction: {0}")]
    InvalidRlp(String),

    #[error("invalid ethereum signature: {0}")]
    InvalidSignature(String),
}
