use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("amount overflow in {0}")]
    Overflow(&'static str),

    #[error("invalid amount: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ValueError>;
