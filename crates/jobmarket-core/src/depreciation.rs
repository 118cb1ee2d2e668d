//! Inactivity fee.
//!
//! A caller idle for at least the configured period pays `⌊balance × rate / 100⌋`
//! on their next mutating call, where `rate` depends on their badge. The call
//! must also have headroom for whatever it is about to spend itself, so both
//! the balance and the allowance to the escrow account are checked against
//! `fee + other_expense`.

use crate::config::DepreciationConfig;
use crate::error::{MarketError, Result};
use jobmarket_ledger::TokenAmount;
use jobmarket_registry::{AccountRecord, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationQuote {
    pub inactive_for_secs: i64,
    /// Zero when the account is not yet dormant
    pub rate_percent: u8,
    pub balance: TokenAmount,
    pub amount: TokenAmount,
}

impl DepreciationQuote {
    pub fn is_due(&self) -> bool {
        !self.amount.is_zero()
    }

    /// Funds and allowance the call needs: the fee plus its own expense
    pub fn required_with(&self, other_expense: TokenAmount) -> Result<TokenAmount> {
        self.amount.checked_add(other_expense).ok_or_else(|| {
            MarketError::ArithmeticOverflow(format!(
                "depreciation {} + expense {}",
                self.amount, other_expense
            ))
        })
    }
}

/// Fee owed by `record` at `now` on a balance of `balance`.
///
/// Fails on a rate above 100%, which `DepreciationConfig::validate` rules out.
pub fn quote(
    config: &DepreciationConfig,
    record: &AccountRecord,
    balance: TokenAmount,
    now: Timestamp,
) -> Result<DepreciationQuote> {
    let inactive_for_secs = record.inactive_for(now);
    let rate_percent = if inactive_for_secs >= config.inactivity_period_secs {
        config.rate_for(record.badge)
    } else {
        0
    };

    let amount = balance.checked_percent(rate_percent).ok_or_else(|| {
        MarketError::InvalidConfiguration(format!(
            "depreciation rate {}% for {} badge is above 100%",
            rate_percent, record.badge
        ))
    })?;

    Ok(DepreciationQuote {
        inactive_for_secs,
        rate_percent,
        balance,
        amount,
    })
}
