//! JSON command scripts.
//!
//! A script is an array of commands, each tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "verify", "caller": "admin", "account": "alice" },
//!   { "op": "enroll", "caller": "alice" },
//!   { "op": "approve", "owner": "alice", "amount": 5000 },
//!   { "op": "create_job", "caller": "alice", "description": "logo", "reward": 5000 },
//!   { "op": "advance", "days": 91 }
//! ]
//! ```
//!
//! Accounts are labels or hex ids; amounts are base units.

use anyhow::{Context, Result};
use jobmarket_core::{DisputeResolution, JobId, JobStatus};
use jobmarket_ledger::TokenAmount;
use jobmarket_registry::Timestamp;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Verify {
        caller: String,
        account: String,
    },
    Enroll {
        caller: String,
    },
    /// Let the escrow account spend up to `amount` of the owner's tokens
    Approve {
        owner: String,
        amount: TokenAmount,
    },
    /// Faucet for local runs
    Mint {
        to: String,
        amount: TokenAmount,
    },
    CreateJob {
        caller: String,
        description: String,
        reward: TokenAmount,
    },
    TakeJob {
        caller: String,
        job_id: JobId,
    },
    CompleteJob {
        caller: String,
        job_id: JobId,
        rating: u8,
        #[serde(default)]
        disputed: bool,
    },
    CancelJob {
        caller: String,
        job_id: JobId,
    },
    ResolveDispute {
        caller: String,
        job_id: JobId,
        in_favor_of_worker: bool,
    },
    /// Move the simulated clock forward
    Advance {
        days: i64,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Verify { .. } => "verify",
            Self::Enroll { .. } => "enroll",
            Self::Approve { .. } => "approve",
            Self::Mint { .. } => "mint",
            Self::CreateJob { .. } => "create_job",
            Self::TakeJob { .. } => "take_job",
            Self::CompleteJob { .. } => "complete_job",
            Self::CancelJob { .. } => "cancel_job",
            Self::ResolveDispute { .. } => "resolve_dispute",
            Self::Advance { .. } => "advance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Done,
    JobCreated { job_id: JobId },
    Reviewed { job_id: JobId, status: JobStatus },
    Resolved { job_id: JobId, resolution: DisputeResolution },
    ClockAdvanced { now: Timestamp },
}

pub fn parse_script(json: &str) -> Result<Vec<Command>> {
    serde_json::from_str(json).context("parsing command script")
}

pub fn load_script(path: &Path) -> Result<Vec<Command>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    parse_script(&content)
}
