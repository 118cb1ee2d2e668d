use crate::error::{MarketError, Result};
use crate::types::{Job, JobStatus, SettlementTotals};
use jobmarket_ledger::AccountId;
use jobmarket_registry::AccountRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Serializable market state, excluding the token ledger.
///
/// The ledger is persisted separately; a snapshot is only meaningful next to
/// the ledger state it was taken with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub administrator: AccountId,
    pub escrow_account: AccountId,
    pub accounts: Vec<(AccountId, AccountRecord)>,
    pub jobs: Vec<Job>,
    pub next_job_id: u64,
    #[serde(default)]
    pub totals: SettlementTotals,
}

impl MarketSnapshot {
    /// Structural checks before a snapshot is loaded
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for job in &self.jobs {
            if !seen.insert(job.id) {
                return Err(MarketError::InvalidSnapshot(format!(
                    "duplicate job id {}",
                    job.id
                )));
            }
            if job.id.0 >= self.next_job_id {
                return Err(MarketError::InvalidSnapshot(format!(
                    "job {} not below next id {}",
                    job.id, self.next_job_id
                )));
            }
            let needs_worker = !matches!(job.status, JobStatus::Created | JobStatus::Cancelled);
            if needs_worker && job.worker.is_none() {
                return Err(MarketError::InvalidSnapshot(format!(
                    "job {} is {} without a worker",
                    job.id, job.status
                )));
            }
            if job.resolution.is_some() && !job.status.is_terminal() {
                return Err(MarketError::InvalidSnapshot(format!(
                    "job {} is {} but carries a dispute resolution",
                    job.id, job.status
                )));
            }
        }

        let mut accounts = BTreeSet::new();
        for (account, record) in &self.accounts {
            if !accounts.insert(*account) {
                return Err(MarketError::InvalidSnapshot(format!(
                    "duplicate account {}",
                    account
                )));
            }
            if *account == self.escrow_account && (record.registered || record.verified) {
                return Err(MarketError::InvalidSnapshot(format!(
                    "escrow account {} appears as a participant",
                    account
                )));
            }
            if record.registered && !record.verified {
                return Err(MarketError::InvalidSnapshot(format!(
                    "account {} registered without verification",
                    account
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobId;
    use jobmarket_ledger::TokenAmount;

    fn job(id: u64, status: JobStatus, worker: Option<AccountId>) -> Job {
        Job {
            id: JobId(id),
            creator: AccountId::from_label("creator"),
            worker,
            description: "job".to_string(),
            reward: TokenAmount::from_tokens(1),
            stars: None,
            status,
            created_at: 0,
            updated_at: 0,
            resolution: None,
        }
    }

    fn snapshot(jobs: Vec<Job>, next_job_id: u64) -> MarketSnapshot {
        MarketSnapshot {
            administrator: AccountId::from_label("admin"),
            escrow_account: AccountId::from_label("escrow"),
            accounts: Vec::new(),
            jobs,
            next_job_id,
            totals: SettlementTotals::default(),
        }
    }

    #[test]
    fn test_valid_snapshot() {
        let worker = Some(AccountId::from_label("worker"));
        let s = snapshot(
            vec![job(0, JobStatus::Created, None), job(1, JobStatus::Taken, worker)],
            2,
        );
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_rejects_id_at_or_above_counter() {
        let s = snapshot(vec![job(2, JobStatus::Created, None)], 2);
        assert!(matches!(s.validate(), Err(MarketError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_rejects_taken_without_worker() {
        let s = snapshot(vec![job(0, JobStatus::Taken, None)], 1);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_registered_unverified() {
        let mut s = snapshot(Vec::new(), 0);
        s.accounts.push((
            AccountId::from_label("alice"),
            AccountRecord {
                registered: true,
                ..Default::default()
            },
        ));
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_escrow_as_participant() {
        let mut s = snapshot(Vec::new(), 0);
        s.accounts.push((
            AccountId::from_label("escrow"),
            AccountRecord {
                verified: true,
                ..Default::default()
            },
        ));
        assert!(matches!(s.validate(), Err(MarketError::InvalidSnapshot(_))));
    }
}
