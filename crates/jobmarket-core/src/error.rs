use crate::types::{JobId, JobStatus};
use jobmarket_ledger::{AccountId, LedgerError, TokenAmount};
use jobmarket_registry::RegistryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarketError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("Caller {caller} is not the administrator")]
    NotAdministrator { caller: AccountId },

    #[error("Only the creator of job {job_id} can do this, caller was {caller}")]
    NotJobCreator { job_id: JobId, caller: AccountId },

    #[error("Account {0} is reserved for the market and cannot participate")]
    ReservedAccount(AccountId),

    #[error("Worker cannot be the creator of job {job_id}")]
    WorkerCannotBeCreator { job_id: JobId },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Job {job_id} status incorrect: current {current}, expected {expected}")]
    JobStatusIncorrect {
        job_id: JobId,
        current: JobStatus,
        expected: JobStatus,
    },

    #[error("Job {0} has no worker assigned")]
    MissingWorker(JobId),

    #[error("Rating {rating} out of range: must be between 0 and {max}")]
    RatingOutOfRange { rating: u8, max: u8 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient funds: required {required}")]
    InsufficientFunds { required: TokenAmount },

    #[error("Insufficient allowance: required {required}")]
    InsufficientAllowance { required: TokenAmount },

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Coarse grouping of failures, used for logging and CLI exit reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authorization,
    Eligibility,
    State,
    Input,
    Economic,
    Internal,
}

impl MarketError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotAdministrator { .. }
            | Self::NotJobCreator { .. }
            | Self::ReservedAccount(_)
            | Self::WorkerCannotBeCreator { .. } => ErrorCategory::Authorization,
            Self::Registry(_) => ErrorCategory::Eligibility,
            Self::JobNotFound(_) | Self::JobStatusIncorrect { .. } | Self::MissingWorker(_) => {
                ErrorCategory::State
            }
            Self::RatingOutOfRange { .. } | Self::InvalidArgument(_) => ErrorCategory::Input,
            Self::InsufficientFunds { .. } | Self::InsufficientAllowance { .. } => {
                ErrorCategory::Economic
            }
            Self::ArithmeticOverflow(_)
            | Self::Ledger(_)
            | Self::InvalidConfiguration(_)
            | Self::InvalidSnapshot(_) => ErrorCategory::Internal,
        }
    }
}
