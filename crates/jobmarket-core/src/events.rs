use crate::types::{DisputeResolution, JobId};
use jobmarket_ledger::{AccountId, TokenAmount};
use jobmarket_registry::{Badge, Timestamp};
use serde::{Deserialize, Serialize};

/// State changes published after a call succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MarketEvent {
    AccountVerified {
        account: AccountId,
        timestamp: Timestamp,
    },

    /// One-time enrollment signal
    Registered {
        account: AccountId,
        grant: TokenAmount,
        timestamp: Timestamp,
    },

    DepreciationCharged {
        account: AccountId,
        amount: TokenAmount,
        rate_percent: u8,
        inactive_for_secs: i64,
        timestamp: Timestamp,
    },

    JobCreated {
        job_id: JobId,
        creator: AccountId,
        reward: TokenAmount,
        timestamp: Timestamp,
    },

    JobTaken {
        job_id: JobId,
        worker: AccountId,
        timestamp: Timestamp,
    },

    JobCompleted {
        job_id: JobId,
        worker: AccountId,
        stars: u8,
        reward: TokenAmount,
        timestamp: Timestamp,
    },

    JobDisputed {
        job_id: JobId,
        stars: u8,
        timestamp: Timestamp,
    },

    JobCancelled {
        job_id: JobId,
        refunded: TokenAmount,
        timestamp: Timestamp,
    },

    DisputeResolved {
        job_id: JobId,
        resolution: DisputeResolution,
        timestamp: Timestamp,
    },

    BadgeUpgraded {
        account: AccountId,
        badge: Badge,
        completed_jobs: u64,
        timestamp: Timestamp,
    },
}

impl MarketEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AccountVerified { .. } => "AccountVerified",
            Self::Registered { .. } => "Registered",
            Self::DepreciationCharged { .. } => "DepreciationCharged",
            Self::JobCreated { .. } => "JobCreated",
            Self::JobTaken { .. } => "JobTaken",
            Self::JobCompleted { .. } => "JobCompleted",
            Self::JobDisputed { .. } => "JobDisputed",
            Self::JobCancelled { .. } => "JobCancelled",
            Self::DisputeResolved { .. } => "DisputeResolved",
            Self::BadgeUpgraded { .. } => "BadgeUpgraded",
        }
    }

    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Self::JobCreated { job_id, .. }
            | Self::JobTaken { job_id, .. }
            | Self::JobCompleted { job_id, .. }
            | Self::JobDisputed { job_id, .. }
            | Self::JobCancelled { job_id, .. }
            | Self::DisputeResolved { job_id, .. } => Some(*job_id),
            _ => None,
        }
    }
}
