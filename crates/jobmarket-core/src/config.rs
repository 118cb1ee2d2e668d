use crate::error::{MarketError, Result};
use jobmarket_ledger::TokenAmount;
use jobmarket_registry::{Badge, BadgeThresholds};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationConfig {
    /// Inactivity after which the fee applies
    pub inactivity_period_secs: i64,
    /// Integer percent of balance charged per badge tier
    pub rate_none: u8,
    pub rate_bronze: u8,
    pub rate_silver: u8,
    pub rate_gold: u8,
}

impl Default for DepreciationConfig {
    fn default() -> Self {
        Self {
            inactivity_period_secs: 90 * SECONDS_PER_DAY,
            rate_none: 5,
            rate_bronze: 3,
            rate_silver: 2,
            rate_gold: 1,
        }
    }
}

impl DepreciationConfig {
    pub fn rate_for(&self, badge: Badge) -> u8 {
        match badge {
            Badge::None => self.rate_none,
            Badge::Bronze => self.rate_bronze,
            Badge::Silver => self.rate_silver,
            Badge::Gold => self.rate_gold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Tokens granted once on enrollment
    pub registration_grant: TokenAmount,
    /// Highest star rating a creator may give
    pub max_rating: u8,
    pub depreciation: DepreciationConfig,
    pub badges: BadgeThresholds,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            registration_grant: TokenAmount::from_tokens(100),
            max_rating: 5,
            depreciation: DepreciationConfig::default(),
            badges: BadgeThresholds::default(),
        }
    }
}

impl MarketConfig {
    pub fn validate(&self) -> Result<()> {
        let d = &self.depreciation;
        if d.inactivity_period_secs <= 0 {
            return Err(MarketError::InvalidConfiguration(format!(
                "inactivity period must be positive, got {}s",
                d.inactivity_period_secs
            )));
        }
        for (badge, rate) in [
            (Badge::None, d.rate_none),
            (Badge::Bronze, d.rate_bronze),
            (Badge::Silver, d.rate_silver),
            (Badge::Gold, d.rate_gold),
        ] {
            if rate > 100 {
                return Err(MarketError::InvalidConfiguration(format!(
                    "depreciation rate for {} badge is {}%, above 100%",
                    badge, rate
                )));
            }
        }
        if !self.badges.is_increasing() {
            return Err(MarketError::InvalidConfiguration(format!(
                "badge thresholds must be strictly increasing and non-zero: {:?}",
                self.badges
            )));
        }
        Ok(())
    }
}
