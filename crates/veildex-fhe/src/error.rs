use thiserror::Error;

#[derive(Debug, Error)]
pub enum FheError {
    #[error("unknown decryption request: {0}")]
    UnknownRequest(u64),

    #[error("quorum threshold must be at least 1")]
    InvalidThreshold,
}

pub type Result<T> = std::result::Result<T, FheError>;
