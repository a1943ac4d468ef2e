use thiserror::Error;
use veildex_types::AccountId;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("allowance from {owner} to {spender} does not cover the requested amount")]
    InsufficientAllowance { owner: AccountId, spender: AccountId },

    #[error("balance of {0} does not cover the requested amount")]
    InsufficientBalance(AccountId),

    #[error("account has no balance entry: {0}")]
    UnknownAccount(AccountId),
}

pub type Result<T> = std::result::Result<T, TokenError>;
