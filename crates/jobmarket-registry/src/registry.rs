use crate::error::{RegistryError, Result};
use crate::types::{AccountRecord, Badge, BadgeThresholds, Timestamp};
use jobmarket_ledger::AccountId;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Outcome of recording a completed job for a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionUpdate {
    pub completed_jobs: u64,
    pub upgraded_to: Option<Badge>,
}

/// Identity & reputation registry.
///
/// Tracks verification, enrollment, activity and badges per account. Knows
/// nothing about jobs or tokens; the market engine drives it.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    accounts: BTreeMap<AccountId, AccountRecord>,
    thresholds: BadgeThresholds,
}

impl IdentityRegistry {
    pub fn new(thresholds: BadgeThresholds) -> Self {
        Self {
            accounts: BTreeMap::new(),
            thresholds,
        }
    }

    /// Rebuild from persisted records
    pub fn from_records(
        thresholds: BadgeThresholds,
        records: impl IntoIterator<Item = (AccountId, AccountRecord)>,
    ) -> Self {
        Self {
            accounts: records.into_iter().collect(),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &BadgeThresholds {
        &self.thresholds
    }

    pub fn get(&self, account: &AccountId) -> Option<&AccountRecord> {
        self.accounts.get(account)
    }

    /// Record for `account`, or the blank record an unknown account implicitly has
    pub fn record_or_default(&self, account: &AccountId) -> AccountRecord {
        self.accounts.get(account).cloned().unwrap_or_default()
    }

    pub fn records(&self) -> impl Iterator<Item = (&AccountId, &AccountRecord)> {
        self.accounts.iter()
    }

    pub fn registered_count(&self) -> usize {
        self.accounts.values().filter(|r| r.registered).count()
    }

    pub fn is_registered(&self, account: &AccountId) -> bool {
        self.accounts.get(account).is_some_and(|r| r.registered)
    }

    /// Mark an account verified (administrative)
    pub fn verify(&mut self, account: AccountId) -> Result<()> {
        let record = self.accounts.entry(account).or_default();
        if record.verified {
            return Err(RegistryError::AlreadyVerified(account));
        }
        record.verified = true;

        info!(account = %account.short(), "🪪 Account verified");
        Ok(())
    }

    /// Check enrollment preconditions without touching state
    pub fn check_enrollment(&self, account: &AccountId) -> Result<()> {
        let record = self.record_or_default(account);
        if !record.verified {
            return Err(RegistryError::NotVerified(*account));
        }
        if record.registered {
            return Err(RegistryError::AlreadyRegistered(*account));
        }
        Ok(())
    }

    /// Self-service enrollment of a verified account
    pub fn enroll(&mut self, account: AccountId, now: Timestamp) -> Result<()> {
        self.check_enrollment(&account)?;

        let record = self.accounts.entry(account).or_default();
        record.registered = true;
        record.last_activity = now;

        info!(account = %account.short(), at = now, "📝 Account registered");
        Ok(())
    }

    pub fn require_registered(&self, account: &AccountId) -> Result<&AccountRecord> {
        self.accounts
            .get(account)
            .filter(|r| r.registered)
            .ok_or(RegistryError::NotRegistered(*account))
    }

    pub fn record_activity(&mut self, account: AccountId, now: Timestamp) {
        let record = self.accounts.entry(account).or_default();
        record.last_activity = now;
        debug!(account = %account.short(), at = now, "Activity recorded");
    }

    /// Count a completed job for `worker` and apply any badge it unlocks
    pub fn record_completion(&mut self, worker: AccountId) -> CompletionUpdate {
        let record = self.accounts.entry(worker).or_default();
        record.completed_jobs = record.completed_jobs.saturating_add(1);

        let mut upgraded_to = None;
        if let Some(badge) = self.thresholds.unlocked_at(record.completed_jobs) {
            if badge > record.badge {
                record.badge = badge;
                upgraded_to = Some(badge);
                info!(
                    account = %worker.short(),
                    completed_jobs = record.completed_jobs,
                    badge = %badge,
                    "🏅 Badge upgraded"
                );
            }
        }

        debug!(
            account = %worker.short(),
            completed_jobs = record.completed_jobs,
            "Completion recorded"
        );

        CompletionUpdate {
            completed_jobs: record.completed_jobs,
            upgraded_to,
        }
    }
}
