use jobmarket_ledger::AccountId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Account {0} is already verified")]
    AlreadyVerified(AccountId),

    #[error("Account {0} is not verified")]
    NotVerified(AccountId),

    #[error("Account {0} is already registered")]
    AlreadyRegistered(AccountId),

    #[error("Account {0} is not registered")]
    NotRegistered(AccountId),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
