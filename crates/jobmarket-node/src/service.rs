use crate::config::{parse_account, NodeConfig};
use crate::script::{Command, CommandOutcome};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jobmarket_core::{
    DepreciationQuote, Job, JobId, JobMarket, MarketError, MarketEvent, MarketSnapshot,
    MarketStats, SECONDS_PER_DAY,
};
use jobmarket_ledger::{AccountId, MemoryLedger, TokenAmount, TokenLedger};
use jobmarket_registry::{AccountRecord, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

const EVENT_BUFFER: usize = 1024;

/// On-disk node state: the ledger and the market snapshot taken together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub node_name: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub saved_at: DateTime<Utc>,
    /// Simulated time added to wall-clock time by `advance`
    pub clock_offset_secs: i64,
    pub ledger: MemoryLedger,
    pub market: MarketSnapshot,
}

/// Account view returned by status queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub account: AccountId,
    pub balance: TokenAmount,
    pub allowance_to_escrow: TokenAmount,
    #[serde(flatten)]
    pub record: AccountRecord,
}

struct ServiceState {
    market: JobMarket<MemoryLedger>,
    clock_offset_secs: i64,
}

impl ServiceState {
    fn now(&self, wall_clock: Timestamp) -> Timestamp {
        wall_clock.saturating_add(self.clock_offset_secs)
    }
}

/// Serialized access to one job market, with persistence and event fan-out
pub struct MarketService {
    node_name: String,
    state_path: PathBuf,
    state: Mutex<ServiceState>,
    events: broadcast::Sender<MarketEvent>,
}

impl MarketService {
    /// Open the market stored in the configured data dir, or start a fresh one
    pub async fn load_or_init(config: &NodeConfig) -> Result<Self> {
        let market_config = config.market_config()?;
        let state_path = config.state_path();

        let (market, clock_offset_secs) = if tokio::fs::try_exists(&state_path).await? {
            let persisted = read_state(&state_path).await?;
            let market = JobMarket::restore(market_config, persisted.ledger, persisted.market)
                .with_context(|| format!("restoring {}", state_path.display()))?;
            info!(
                path = %state_path.display(),
                saved_at = %persisted.saved_at,
                "📦 Loaded market state"
            );
            (market, persisted.clock_offset_secs)
        } else {
            let market = JobMarket::new(
                market_config,
                config.administrator()?,
                config.escrow_account()?,
                MemoryLedger::new(),
            )?;
            info!(path = %state_path.display(), "✨ Starting a new market");
            (market, 0)
        };

        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Ok(Self {
            node_name: config.node.name.clone(),
            state_path,
            state: Mutex::new(ServiceState {
                market,
                clock_offset_secs,
            }),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.events.subscribe()
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Run one command at wall-clock time `wall_clock` (plus the simulated offset)
    pub async fn execute(
        &self,
        command: Command,
        wall_clock: Timestamp,
    ) -> std::result::Result<CommandOutcome, MarketError> {
        let mut state = self.state.lock().await;
        let now = state.now(wall_clock);
        let name = command.name();

        let outcome = apply(&mut state, command, now);
        let events = state.market.drain_events();
        drop(state);

        match &outcome {
            Ok(result) => debug!(command = name, result = ?result, "Command applied"),
            Err(e) => warn!(
                command = name,
                category = ?e.category(),
                error = %e,
                "❌ Command rejected"
            ),
        }

        for event in events {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
        outcome
    }

    /// Write ledger and market state to `state.json`
    pub async fn persist(&self) -> Result<()> {
        let persisted = {
            let state = self.state.lock().await;
            PersistedState {
                node_name: self.node_name.clone(),
                saved_at: Utc::now(),
                clock_offset_secs: state.clock_offset_secs,
                ledger: state.market.ledger().clone(),
                market: state.market.snapshot(),
            }
        };

        if let Some(dir) = self.state_path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_vec_pretty(&persisted)?;
        let tmp = self.state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.state_path).await?;

        info!(
            path = %self.state_path.display(),
            jobs = persisted.market.jobs.len(),
            "💾 Market state saved"
        );
        Ok(())
    }

    pub async fn stats(&self) -> MarketStats {
        self.state.lock().await.market.stats()
    }

    pub async fn job(&self, job_id: JobId) -> Option<Job> {
        self.state.lock().await.market.job(job_id).cloned()
    }

    pub async fn accounts(&self) -> Vec<AccountView> {
        let state = self.state.lock().await;
        let market = &state.market;
        let escrow = market.escrow_account();
        market
            .registry()
            .records()
            .map(|(account, record)| AccountView {
                account: *account,
                balance: market.ledger().balance_of(account),
                allowance_to_escrow: market.ledger().allowance(account, &escrow),
                record: record.clone(),
            })
            .collect()
    }

    pub async fn quote(
        &self,
        account: AccountId,
        wall_clock: Timestamp,
    ) -> std::result::Result<DepreciationQuote, MarketError> {
        let state = self.state.lock().await;
        let now = state.now(wall_clock);
        state.market.quote_depreciation(&account, now)
    }

    pub async fn now(&self, wall_clock: Timestamp) -> Timestamp {
        self.state.lock().await.now(wall_clock)
    }
}

async fn read_state(path: &Path) -> Result<PersistedState> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn apply(
    state: &mut ServiceState,
    command: Command,
    now: Timestamp,
) -> std::result::Result<CommandOutcome, MarketError> {
    let market = &mut state.market;
    match command {
        Command::Verify { caller, account } => {
            market.verify(parse_account(&caller)?, parse_account(&account)?, now)?;
            Ok(CommandOutcome::Done)
        }
        Command::Enroll { caller } => {
            market.enroll(parse_account(&caller)?, now)?;
            Ok(CommandOutcome::Done)
        }
        Command::Approve { owner, amount } => {
            let owner = parse_account(&owner)?;
            let escrow = market.escrow_account();
            market.ledger_mut().approve(&owner, &escrow, amount)?;
            Ok(CommandOutcome::Done)
        }
        Command::Mint { to, amount } => {
            market.ledger_mut().mint(&parse_account(&to)?, amount)?;
            Ok(CommandOutcome::Done)
        }
        Command::CreateJob {
            caller,
            description,
            reward,
        } => {
            let job_id = market.create_job(parse_account(&caller)?, description, reward, now)?;
            Ok(CommandOutcome::JobCreated { job_id })
        }
        Command::TakeJob { caller, job_id } => {
            market.take_job(parse_account(&caller)?, job_id, now)?;
            Ok(CommandOutcome::Done)
        }
        Command::CompleteJob {
            caller,
            job_id,
            rating,
            disputed,
        } => {
            let status =
                market.complete_and_review_job(parse_account(&caller)?, job_id, rating, disputed, now)?;
            Ok(CommandOutcome::Reviewed { job_id, status })
        }
        Command::CancelJob { caller, job_id } => {
            market.cancel_job(parse_account(&caller)?, job_id, now)?;
            Ok(CommandOutcome::Done)
        }
        Command::ResolveDispute {
            caller,
            job_id,
            in_favor_of_worker,
        } => {
            let resolution =
                market.handle_disputed_job(parse_account(&caller)?, job_id, in_favor_of_worker, now)?;
            Ok(CommandOutcome::Resolved { job_id, resolution })
        }
        Command::Advance { days } => {
            if days < 0 {
                return Err(MarketError::InvalidArgument(format!(
                    "cannot advance the clock by {} days",
                    days
                )));
            }
            let secs = days.checked_mul(SECONDS_PER_DAY).ok_or_else(|| {
                MarketError::ArithmeticOverflow(format!("advancing {} days", days))
            })?;
            state.clock_offset_secs = state.clock_offset_secs.saturating_add(secs);
            let now = now.saturating_add(secs);
            info!(days, now, "⏩ Clock advanced");
            Ok(CommandOutcome::ClockAdvanced { now })
        }
    }
}
