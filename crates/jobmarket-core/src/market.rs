use crate::config::MarketConfig;
use crate::depreciation::{self, DepreciationQuote};
use crate::error::{MarketError, Result};
use crate::escrow::EscrowVault;
use crate::events::MarketEvent;
use crate::snapshot::MarketSnapshot;
use crate::types::*;
use jobmarket_ledger::{AccountId, TokenAmount, TokenLedger};
use jobmarket_registry::{AccountRecord, IdentityRegistry, Timestamp};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

/// Effects staged by a call and published only if it succeeds
#[derive(Debug, Default)]
struct CallEffects {
    events: Vec<MarketEvent>,
    totals: SettlementTotals,
}

/// The job market: registry, job table and escrow accounting in one context.
///
/// Every operation takes the caller and the current time explicitly. Calls
/// are all-or-nothing: ledger movements run inside a ledger transaction that
/// is rolled back on failure, and the registry and job tables are written
/// only after the last fallible step of a call.
pub struct JobMarket<L: TokenLedger> {
    config: MarketConfig,
    administrator: AccountId,
    escrow_account: AccountId,
    ledger: L,
    registry: IdentityRegistry,
    jobs: BTreeMap<JobId, Job>,
    next_job_id: u64,
    totals: SettlementTotals,
    events: Vec<MarketEvent>,
}

impl<L: TokenLedger> JobMarket<L> {
    pub fn new(
        config: MarketConfig,
        administrator: AccountId,
        escrow_account: AccountId,
        ledger: L,
    ) -> Result<Self> {
        config.validate()?;
        if administrator == escrow_account {
            return Err(MarketError::InvalidConfiguration(
                "administrator and escrow account must differ".to_string(),
            ));
        }

        info!(
            administrator = %administrator.short(),
            escrow = %escrow_account.short(),
            grant = config.registration_grant.to_base_units(),
            inactivity_secs = config.depreciation.inactivity_period_secs,
            "✨ Job market initialized"
        );

        Ok(Self {
            registry: IdentityRegistry::new(config.badges),
            config,
            administrator,
            escrow_account,
            ledger,
            jobs: BTreeMap::new(),
            next_job_id: 0,
            totals: SettlementTotals::default(),
            events: Vec::new(),
        })
    }

    /// Rebuild a market from a snapshot and the ledger it was taken alongside
    pub fn restore(config: MarketConfig, ledger: L, snapshot: MarketSnapshot) -> Result<Self> {
        snapshot.validate()?;
        let mut market = Self::new(
            config,
            snapshot.administrator,
            snapshot.escrow_account,
            ledger,
        )?;

        market.registry = IdentityRegistry::from_records(market.config.badges, snapshot.accounts);
        market.jobs = snapshot.jobs.into_iter().map(|j| (j.id, j)).collect();
        market.next_job_id = snapshot.next_job_id;
        market.totals = snapshot.totals;

        info!(
            jobs = market.jobs.len(),
            accounts = market.registry.records().count(),
            next_job_id = market.next_job_id,
            "📦 Job market restored from snapshot"
        );
        Ok(market)
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            administrator: self.administrator,
            escrow_account: self.escrow_account,
            accounts: self
                .registry
                .records()
                .map(|(id, record)| (*id, record.clone()))
                .collect(),
            jobs: self.jobs.values().cloned().collect(),
            next_job_id: self.next_job_id,
            totals: self.totals,
        }
    }

    // ---- administrative -------------------------------------------------

    /// Mark `account` verified so it can enroll
    pub fn verify(&mut self, caller: AccountId, account: AccountId, now: Timestamp) -> Result<()> {
        self.ensure_administrator(caller)?;
        self.ensure_not_reserved(account)?;
        self.registry.verify(account)?;
        self.record_administrator_activity(now);
        self.events.push(MarketEvent::AccountVerified {
            account,
            timestamp: now,
        });
        Ok(())
    }

    /// Final decision on a disputed job
    pub fn handle_disputed_job(
        &mut self,
        caller: AccountId,
        job_id: JobId,
        in_favor_of_worker: bool,
        now: Timestamp,
    ) -> Result<DisputeResolution> {
        self.atomically("handle_disputed_job", caller, |market, effects| {
            market.ensure_administrator(caller)?;

            let job = market.job_ref(job_id)?;
            expect_status(job, JobStatus::Disputed)?;
            let worker = job.worker.ok_or(MarketError::MissingWorker(job_id))?;
            let creator = job.creator;
            let reward = job.reward;

            let resolution = if in_favor_of_worker {
                market.vault().release(&worker, reward)?;
                effects.totals.paid_out = effects.totals.paid_out.saturating_add(reward);
                DisputeResolution::WorkerPaid
            } else {
                market.vault().refund(&creator, reward)?;
                effects.totals.refunded = effects.totals.refunded.saturating_add(reward);
                DisputeResolution::CreatorRefunded
            };

            let job = market.job_mut(job_id)?;
            move_to(job, JobStatus::Completed, now);
            job.resolution = Some(resolution);
            market.record_administrator_activity(now);

            effects.events.push(MarketEvent::DisputeResolved {
                job_id,
                resolution,
                timestamp: now,
            });
            if resolution == DisputeResolution::WorkerPaid {
                market.credit_completion(worker, now, effects);
            }

            info!(
                job_id = %job_id,
                resolution = ?resolution,
                reward = reward.to_base_units(),
                "⚖️ Dispute resolved"
            );
            Ok(resolution)
        })
    }

    // ---- participant ----------------------------------------------------

    /// Enroll a verified account and pay out the registration grant
    pub fn enroll(&mut self, caller: AccountId, now: Timestamp) -> Result<()> {
        self.atomically("enroll", caller, |market, effects| {
            market.ensure_not_reserved(caller)?;
            market.registry.check_enrollment(&caller)?;

            let grant = market.config.registration_grant;
            market.ledger.mint(&caller, grant)?;
            market.registry.enroll(caller, now)?;

            effects.events.push(MarketEvent::Registered {
                account: caller,
                grant,
                timestamp: now,
            });
            Ok(())
        })
    }

    /// Post a job, escrowing `reward` from the caller
    pub fn create_job(
        &mut self,
        caller: AccountId,
        description: impl Into<String>,
        reward: TokenAmount,
        now: Timestamp,
    ) -> Result<JobId> {
        let description = description.into();
        self.atomically("create_job", caller, |market, effects| {
            market.ensure_not_reserved(caller)?;
            market.registry.require_registered(&caller)?;
            market.settle_depreciation(caller, reward, now, effects)?;

            let job_id = JobId(market.next_job_id);
            let next_job_id = market
                .next_job_id
                .checked_add(1)
                .ok_or_else(|| MarketError::ArithmeticOverflow("job id counter".to_string()))?;

            market.vault().lock(&caller, reward)?;

            market.next_job_id = next_job_id;
            market.jobs.insert(
                job_id,
                Job {
                    id: job_id,
                    creator: caller,
                    worker: None,
                    description,
                    reward,
                    stars: None,
                    status: JobStatus::Created,
                    created_at: now,
                    updated_at: now,
                    resolution: None,
                },
            );
            market.registry.record_activity(caller, now);

            effects.events.push(MarketEvent::JobCreated {
                job_id,
                creator: caller,
                reward,
                timestamp: now,
            });
            info!(
                job_id = %job_id,
                creator = %caller.short(),
                reward = reward.to_base_units(),
                "📋 Job created"
            );
            Ok(job_id)
        })
    }

    /// Accept an open job as its worker
    pub fn take_job(&mut self, caller: AccountId, job_id: JobId, now: Timestamp) -> Result<()> {
        self.atomically("take_job", caller, |market, effects| {
            market.ensure_not_reserved(caller)?;
            market.registry.require_registered(&caller)?;
            market.settle_depreciation(caller, TokenAmount::ZERO, now, effects)?;

            let job = market.job_ref(job_id)?;
            expect_status(job, JobStatus::Created)?;
            if job.creator == caller {
                return Err(MarketError::WorkerCannotBeCreator { job_id });
            }

            let job = market.job_mut(job_id)?;
            move_to(job, JobStatus::Taken, now);
            job.worker = Some(caller);
            market.registry.record_activity(caller, now);

            effects.events.push(MarketEvent::JobTaken {
                job_id,
                worker: caller,
                timestamp: now,
            });
            info!(job_id = %job_id, worker = %caller.short(), "👷 Job taken");
            Ok(())
        })
    }

    /// Rate the work and either pay the worker or flag a dispute
    pub fn complete_and_review_job(
        &mut self,
        caller: AccountId,
        job_id: JobId,
        rating: u8,
        disputed: bool,
        now: Timestamp,
    ) -> Result<JobStatus> {
        self.atomically("complete_and_review_job", caller, |market, effects| {
            market.registry.require_registered(&caller)?;
            market.settle_depreciation(caller, TokenAmount::ZERO, now, effects)?;

            let job = market.job_ref(job_id)?;
            if job.creator != caller {
                return Err(MarketError::NotJobCreator { job_id, caller });
            }
            expect_status(job, JobStatus::Taken)?;
            if rating > market.config.max_rating {
                return Err(MarketError::RatingOutOfRange {
                    rating,
                    max: market.config.max_rating,
                });
            }
            let worker = job.worker.ok_or(MarketError::MissingWorker(job_id))?;
            let reward = job.reward;

            let status = if disputed {
                JobStatus::Disputed
            } else {
                market.vault().release(&worker, reward)?;
                effects.totals.paid_out = effects.totals.paid_out.saturating_add(reward);
                JobStatus::Completed
            };

            let job = market.job_mut(job_id)?;
            job.stars = Some(rating);
            move_to(job, status, now);
            market.registry.record_activity(caller, now);

            if disputed {
                effects.events.push(MarketEvent::JobDisputed {
                    job_id,
                    stars: rating,
                    timestamp: now,
                });
                info!(job_id = %job_id, stars = rating, "🚩 Job disputed");
            } else {
                effects.events.push(MarketEvent::JobCompleted {
                    job_id,
                    worker,
                    stars: rating,
                    reward,
                    timestamp: now,
                });
                market.credit_completion(worker, now, effects);
                info!(
                    job_id = %job_id,
                    worker = %worker.short(),
                    stars = rating,
                    reward = reward.to_base_units(),
                    "✅ Job completed"
                );
            }
            Ok(status)
        })
    }

    /// Withdraw an untaken job and refund its reward
    pub fn cancel_job(&mut self, caller: AccountId, job_id: JobId, now: Timestamp) -> Result<()> {
        self.atomically("cancel_job", caller, |market, effects| {
            market.registry.require_registered(&caller)?;
            market.settle_depreciation(caller, TokenAmount::ZERO, now, effects)?;

            let job = market.job_ref(job_id)?;
            if job.creator != caller {
                return Err(MarketError::NotJobCreator { job_id, caller });
            }
            expect_status(job, JobStatus::Created)?;
            let reward = job.reward;

            market.vault().refund(&caller, reward)?;
            effects.totals.refunded = effects.totals.refunded.saturating_add(reward);

            let job = market.job_mut(job_id)?;
            move_to(job, JobStatus::Cancelled, now);
            market.registry.record_activity(caller, now);

            effects.events.push(MarketEvent::JobCancelled {
                job_id,
                refunded: reward,
                timestamp: now,
            });
            info!(job_id = %job_id, refunded = reward.to_base_units(), "🗑️ Job cancelled");
            Ok(())
        })
    }

    // ---- queries --------------------------------------------------------

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn administrator(&self) -> AccountId {
        self.administrator
    }

    pub fn escrow_account(&self) -> AccountId {
        self.escrow_account
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access for token operations outside the market (approvals, faucets)
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn account(&self, account: &AccountId) -> Option<&AccountRecord> {
        self.registry.get(account)
    }

    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn jobs_by_status(&self, status: JobStatus) -> Vec<&Job> {
        self.jobs.values().filter(|j| j.status == status).collect()
    }

    /// Jobs where `account` is the creator or the worker
    pub fn jobs_for_account(&self, account: &AccountId) -> Vec<&Job> {
        self.jobs.values().filter(|j| j.involves(account)).collect()
    }

    pub fn next_job_id(&self) -> JobId {
        JobId(self.next_job_id)
    }

    /// Fee `account` would pay on a mutating call at `now`
    pub fn quote_depreciation(
        &self,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<DepreciationQuote> {
        let record = self.registry.record_or_default(account);
        let balance = self.ledger.balance_of(account);
        depreciation::quote(&self.config.depreciation, &record, balance, now)
    }

    /// Sum of rewards currently held for open jobs
    pub fn escrowed_total(&self) -> TokenAmount {
        self.jobs
            .values()
            .filter(|j| j.status.holds_escrow())
            .fold(TokenAmount::ZERO, |acc, j| acc.saturating_add(j.reward))
    }

    pub fn totals(&self) -> SettlementTotals {
        self.totals
    }

    pub fn stats(&self) -> MarketStats {
        let mut stats = MarketStats {
            total_jobs: self.jobs.len() as u64,
            registered_accounts: self.registry.registered_count() as u64,
            escrowed: self.escrowed_total(),
            totals: self.totals,
            ..Default::default()
        };

        for job in self.jobs.values() {
            match job.status {
                JobStatus::Created => stats.created_jobs += 1,
                JobStatus::Taken => stats.taken_jobs += 1,
                JobStatus::Disputed => stats.disputed_jobs += 1,
                JobStatus::Completed => stats.completed_jobs += 1,
                JobStatus::Cancelled => stats.cancelled_jobs += 1,
            }
        }
        stats
    }

    /// Hand out events published since the last drain
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- internals ------------------------------------------------------

    fn ensure_administrator(&self, caller: AccountId) -> Result<()> {
        if caller != self.administrator {
            return Err(MarketError::NotAdministrator { caller });
        }
        Ok(())
    }

    /// The escrow account holds rewards and fees; it never acts as a participant
    fn ensure_not_reserved(&self, account: AccountId) -> Result<()> {
        if account == self.escrow_account {
            return Err(MarketError::ReservedAccount(account));
        }
        Ok(())
    }

    /// Administrative calls refresh activity only for an administrator known to the registry
    fn record_administrator_activity(&mut self, now: Timestamp) {
        if self.registry.get(&self.administrator).is_some() {
            self.registry.record_activity(self.administrator, now);
        }
    }

    fn vault(&mut self) -> EscrowVault<'_, L> {
        EscrowVault::new(&mut self.ledger, self.escrow_account)
    }

    fn job_ref(&self, job_id: JobId) -> Result<&Job> {
        self.jobs.get(&job_id).ok_or(MarketError::JobNotFound(job_id))
    }

    fn job_mut(&mut self, job_id: JobId) -> Result<&mut Job> {
        self.jobs
            .get_mut(&job_id)
            .ok_or(MarketError::JobNotFound(job_id))
    }

    /// Charge the caller's inactivity fee, if any, and make sure the call
    /// also has headroom for `other_expense`.
    ///
    /// Funds are checked before allowance, both against fee + expense.
    fn settle_depreciation(
        &mut self,
        caller: AccountId,
        other_expense: TokenAmount,
        now: Timestamp,
        effects: &mut CallEffects,
    ) -> Result<DepreciationQuote> {
        let quote = self.quote_depreciation(&caller, now)?;
        let required = quote.required_with(other_expense)?;

        if quote.balance < required {
            return Err(MarketError::InsufficientFunds { required });
        }
        let allowance = self.ledger.allowance(&caller, &self.escrow_account);
        if allowance < required {
            return Err(MarketError::InsufficientAllowance { required });
        }

        if quote.is_due() {
            self.vault().collect_fee(&caller, quote.amount)?;
            effects.totals.depreciation_collected = effects
                .totals
                .depreciation_collected
                .saturating_add(quote.amount);
            effects.events.push(MarketEvent::DepreciationCharged {
                account: caller,
                amount: quote.amount,
                rate_percent: quote.rate_percent,
                inactive_for_secs: quote.inactive_for_secs,
                timestamp: now,
            });
            info!(
                account = %caller.short(),
                amount = quote.amount.to_base_units(),
                rate_percent = quote.rate_percent,
                inactive_days = quote.inactive_for_secs / crate::config::SECONDS_PER_DAY,
                "📉 Depreciation charged"
            );
        }

        Ok(quote)
    }

    fn credit_completion(&mut self, worker: AccountId, now: Timestamp, effects: &mut CallEffects) {
        let update = self.registry.record_completion(worker);
        if let Some(badge) = update.upgraded_to {
            effects.events.push(MarketEvent::BadgeUpgraded {
                account: worker,
                badge,
                completed_jobs: update.completed_jobs,
                timestamp: now,
            });
        }
    }

    fn atomically<T>(
        &mut self,
        operation: &'static str,
        caller: AccountId,
        body: impl FnOnce(&mut Self, &mut CallEffects) -> Result<T>,
    ) -> Result<T> {
        self.ledger.begin_transaction()?;
        let mut effects = CallEffects::default();

        match body(self, &mut effects) {
            Ok(value) => {
                self.ledger.commit_transaction()?;
                self.totals.absorb(&effects.totals);
                debug!(
                    operation,
                    caller = %caller.short(),
                    events = effects.events.len(),
                    "Call committed"
                );
                self.events.extend(effects.events);
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.ledger.rollback_transaction() {
                    error!(
                        operation,
                        error = %rollback_err,
                        "Ledger rollback failed"
                    );
                }
                warn!(
                    operation,
                    caller = %caller.short(),
                    error = %err,
                    "❌ Call rejected"
                );
                Err(err)
            }
        }
    }
}

fn expect_status(job: &Job, expected: JobStatus) -> Result<()> {
    if job.status != expected {
        return Err(MarketError::JobStatusIncorrect {
            job_id: job.id,
            current: job.status,
            expected,
        });
    }
    Ok(())
}

fn move_to(job: &mut Job, next: JobStatus, now: Timestamp) {
    debug_assert!(
        job.status.can_transition_to(&next),
        "illegal transition {} -> {}",
        job.status,
        next
    );
    job.status = next;
    job.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobmarket_ledger::MemoryLedger;

    fn admin() -> AccountId {
        AccountId::from_label("admin")
    }

    fn escrow() -> AccountId {
        AccountId::from_label("escrow")
    }

    fn market() -> JobMarket<MemoryLedger> {
        JobMarket::new(MarketConfig::default(), admin(), escrow(), MemoryLedger::new()).unwrap()
    }

    fn registered(market: &mut JobMarket<MemoryLedger>, label: &str) -> AccountId {
        let account = AccountId::from_label(label);
        market.verify(admin(), account, 0).unwrap();
        market.enroll(account, 0).unwrap();
        account
    }

    #[test]
    fn test_enroll_grants_tokens() {
        let mut market = market();
        let alice = registered(&mut market, "alice");
        assert_eq!(market.ledger().balance_of(&alice), TokenAmount::from_tokens(100));

        let events = market.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], MarketEvent::Registered { .. }));
    }

    #[test]
    fn test_verify_requires_administrator() {
        let mut market = market();
        let alice = AccountId::from_label("alice");
        assert_eq!(
            market.verify(alice, alice, 0).unwrap_err(),
            MarketError::NotAdministrator { caller: alice }
        );
    }

    #[test]
    fn test_job_ids_are_sequential() {
        let mut market = market();
        let alice = registered(&mut market, "alice");
        market
            .ledger_mut()
            .approve(&alice, &escrow(), TokenAmount::from_tokens(100))
            .unwrap();

        let first = market.create_job(alice, "a", TokenAmount::from_tokens(10), 1).unwrap();
        let second = market.create_job(alice, "b", TokenAmount::from_tokens(10), 2).unwrap();
        market.cancel_job(alice, first, 3).unwrap();
        let third = market.create_job(alice, "c", TokenAmount::from_tokens(10), 4).unwrap();

        assert_eq!((first, second, third), (JobId(0), JobId(1), JobId(2)));
    }

    #[test]
    fn test_unknown_job() {
        let mut market = market();
        let alice = registered(&mut market, "alice");
        assert_eq!(
            market.take_job(alice, JobId(9), 1).unwrap_err(),
            MarketError::JobNotFound(JobId(9))
        );
    }

    #[test]
    fn test_new_rejects_shared_admin_escrow() {
        assert!(JobMarket::new(MarketConfig::default(), admin(), admin(), MemoryLedger::new()).is_err());
    }
}
