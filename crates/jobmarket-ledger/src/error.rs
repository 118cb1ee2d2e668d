use crate::types::{AccountId, TokenAmount};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance for {account}: has {available}, needs {needed}")]
    InsufficientBalance {
        account: AccountId,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("Insufficient allowance from {owner} to {spender}: approved {approved}, needs {needed}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        needed: TokenAmount,
        approved: TokenAmount,
    },

    #[error("Balance overflow for {0}")]
    Overflow(AccountId),

    #[error("Cannot transfer to same address: {0}")]
    SelfTransfer(AccountId),

    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("Transaction already in progress")]
    TransactionInProgress,

    #[error("No transaction in progress")]
    NoTransaction,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
