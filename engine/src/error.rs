#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot build Huffman tree from empty data")]
    EmptyInput,

    #[error("invalid encoding at bit {position}: {reason}")]
    InvalidEncoding { position: usize, reason: &'static str },

    #[error("decoded content doesn't match original ({original_len} bytes in, {decoded_len} bytes out)")]
    RoundTripMismatch { original_len: usize, decoded_len: usize },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
