use thiserror::Error;
use veildex_token::TokenError;
use veildex_types::{AccountId, EpochId};

use crate::queue::OrderKind;

/// Errors surfaced by the pair's public entry points
/// Every precondition failure aborts the call with no partial state change
#[derive(Debug, Error)]
pub enum PairError {
    #[error("order targets epoch {got} but the current trading epoch is {expected}")]
    EpochMismatch { expected: EpochId, got: EpochId },

    #[error("stale approval: {0} has not granted the pool a covering allowance")]
    StaleApproval(AccountId),

    #[error("epoch {0} is not settled yet")]
    EpochNotSettled(EpochId),

    #[error("claim replay: epoch {epoch}, account {account}, kind {kind:?}")]
    AlreadyClaimed {
        epoch: EpochId,
        account: AccountId,
        kind: OrderKind,
    },

    #[error("no {kind:?} order from {account} in epoch {epoch}")]
    OrderNotFound {
        epoch: EpochId,
        account: AccountId,
        kind: OrderKind,
    },

    #[error("reveal for epoch {0} is still pending; retry settlement")]
    RevealPending(EpochId),

    #[error("claim arithmetic for epoch {0} would overdraw the settled aggregate")]
    RoundingUnderflow(EpochId),

    #[error("claims for epoch {0} are halted")]
    ClaimsHalted(EpochId),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PairError>;
