use jobmarket_ledger::{AccountId, TokenAmount};
use jobmarket_registry::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential job identifier, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Created,   // Reward escrowed, waiting for a worker
    Taken,     // Worker assigned
    Completed, // Paid out or resolved
    Cancelled, // Refunded before anyone took it
    Disputed,  // Creator withheld payment, awaiting the administrator
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Reward is still held by the escrow account
    pub fn holds_escrow(&self) -> bool {
        matches!(self, Self::Created | Self::Taken | Self::Disputed)
    }

    pub fn can_transition_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Taken)
                | (Self::Created, Self::Cancelled)
                | (Self::Taken, Self::Completed)
                | (Self::Taken, Self::Disputed)
                | (Self::Disputed, Self::Completed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "CREATED",
            Self::Taken => "TAKEN",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Disputed => "DISPUTED",
        };
        f.write_str(name)
    }
}

/// Administrator's final word on a disputed job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeResolution {
    WorkerPaid,
    CreatorRefunded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub creator: AccountId,
    pub worker: Option<AccountId>,
    pub description: String,
    pub reward: TokenAmount,
    pub stars: Option<u8>,
    pub status: JobStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub resolution: Option<DisputeResolution>,
}

impl Job {
    pub fn involves(&self, account: &AccountId) -> bool {
        self.creator == *account || self.worker.as_ref() == Some(account)
    }
}

/// Running totals of tokens that left escrow or were charged as depreciation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTotals {
    pub paid_out: TokenAmount,
    pub refunded: TokenAmount,
    pub depreciation_collected: TokenAmount,
}

impl SettlementTotals {
    pub(crate) fn absorb(&mut self, other: &SettlementTotals) {
        self.paid_out = self.paid_out.saturating_add(other.paid_out);
        self.refunded = self.refunded.saturating_add(other.refunded);
        self.depreciation_collected = self
            .depreciation_collected
            .saturating_add(other.depreciation_collected);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    pub total_jobs: u64,
    pub created_jobs: u64,
    pub taken_jobs: u64,
    pub disputed_jobs: u64,
    pub completed_jobs: u64,
    pub cancelled_jobs: u64,
    pub registered_accounts: u64,
    pub escrowed: TokenAmount,
    pub totals: SettlementTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use JobStatus::*;
        let all = [Created, Taken, Completed, Cancelled, Disputed];
        let allowed = [
            (Created, Taken),
            (Created, Cancelled),
            (Taken, Completed),
            (Taken, Disputed),
            (Disputed, Completed),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(&to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_hold_no_escrow() {
        for status in [
            JobStatus::Created,
            JobStatus::Taken,
            JobStatus::Completed,
            JobStatus::Cancelled,
            JobStatus::Disputed,
        ] {
            assert_ne!(status.is_terminal(), status.holds_escrow());
        }
    }
}
