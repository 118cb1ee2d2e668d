use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Reputation tier earned through completed jobs
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Badge::None => "none",
            Badge::Bronze => "bronze",
            Badge::Silver => "silver",
            Badge::Gold => "gold",
        };
        f.write_str(name)
    }
}

/// Completed-job counts at which each badge is awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeThresholds {
    pub bronze: u64,
    pub silver: u64,
    pub gold: u64,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            bronze: 10,
            silver: 30,
            gold: 50,
        }
    }
}

impl BadgeThresholds {
    /// Badge unlocked when the counter lands exactly on a threshold.
    ///
    /// Counters only ever move by one, so equality catches every crossing.
    pub fn unlocked_at(&self, completed_jobs: u64) -> Option<Badge> {
        if completed_jobs == self.gold {
            Some(Badge::Gold)
        } else if completed_jobs == self.silver {
            Some(Badge::Silver)
        } else if completed_jobs == self.bronze {
            Some(Badge::Bronze)
        } else {
            None
        }
    }

    pub fn is_increasing(&self) -> bool {
        0 < self.bronze && self.bronze < self.silver && self.silver < self.gold
    }
}

/// Per-account identity and reputation state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub verified: bool,
    pub registered: bool,
    pub last_activity: Timestamp,
    pub completed_jobs: u64,
    pub badge: Badge,
}

impl AccountRecord {
    /// Seconds since the last recorded activity (zero if the clock went backwards)
    pub fn inactive_for(&self, now: Timestamp) -> i64 {
        now.saturating_sub(self.last_activity).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_ordering() {
        assert!(Badge::None < Badge::Bronze);
        assert!(Badge::Bronze < Badge::Silver);
        assert!(Badge::Silver < Badge::Gold);
    }

    #[test]
    fn test_unlocked_only_on_exact_thresholds() {
        let thresholds = BadgeThresholds::default();
        assert_eq!(thresholds.unlocked_at(9), None);
        assert_eq!(thresholds.unlocked_at(10), Some(Badge::Bronze));
        assert_eq!(thresholds.unlocked_at(11), None);
        assert_eq!(thresholds.unlocked_at(30), Some(Badge::Silver));
        assert_eq!(thresholds.unlocked_at(50), Some(Badge::Gold));
        assert_eq!(thresholds.unlocked_at(51), None);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(BadgeThresholds::default().is_increasing());
        assert!(!BadgeThresholds { bronze: 10, silver: 10, gold: 50 }.is_increasing());
        assert!(!BadgeThresholds { bronze: 0, silver: 1, gold: 2 }.is_increasing());
    }
}
