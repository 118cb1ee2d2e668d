use anyhow::{Context, Result};
use jobmarket_core::{DepreciationConfig, MarketConfig, SECONDS_PER_DAY};
use jobmarket_ledger::{AccountId, TokenAmount};
use jobmarket_registry::BadgeThresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

pub const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node: NodeSettings,
    pub market: MarketSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSettings {
    pub data_dir: PathBuf,
    pub name: String,
}

/// Market parameters in operator units: whole tokens and days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSettings {
    /// Hex account id or a label
    pub administrator: String,
    pub escrow_account: String,
    pub registration_grant: u64,
    pub max_rating: u8,
    pub inactivity_days: i64,
    pub rate_none: u8,
    pub rate_bronze: u8,
    pub rate_silver: u8,
    pub rate_gold: u8,
    pub bronze_threshold: u64,
    pub silver_threshold: u64,
    pub gold_threshold: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// pretty, compact or json
    pub format: String,
    pub file_output: Option<PathBuf>,
    pub module_filters: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_output: None,
            module_filters: BTreeMap::new(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        let market = MarketConfig::default();
        Self {
            node: NodeSettings {
                data_dir: PathBuf::from("./data"),
                name: "jobmarket-node".to_string(),
            },
            market: MarketSettings {
                administrator: "admin".to_string(),
                escrow_account: "escrow".to_string(),
                registration_grant: market.registration_grant.to_base_units()
                    / jobmarket_ledger::UNITS_PER_TOKEN,
                max_rating: market.max_rating,
                inactivity_days: market.depreciation.inactivity_period_secs / SECONDS_PER_DAY,
                rate_none: market.depreciation.rate_none,
                rate_bronze: market.depreciation.rate_bronze,
                rate_silver: market.depreciation.rate_silver,
                rate_gold: market.depreciation.rate_gold,
                bronze_threshold: market.badges.bronze,
                silver_threshold: market.badges.silver,
                gold_threshold: market.badges.gold,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl NodeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        // Env overrides are applied by the caller so it controls precedence
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = env::var("JOBMARKET_DATA_DIR") {
            if !data_dir.is_empty() {
                self.node.data_dir = PathBuf::from(data_dir);
            }
        }
        if let Ok(name) = env::var("JOBMARKET_NODE_NAME") {
            if !name.is_empty() {
                self.node.name = name;
            }
        }

        if let Ok(admin) = env::var("JOBMARKET_ADMIN") {
            if !admin.is_empty() {
                self.market.administrator = admin;
            }
        }
        if let Ok(escrow) = env::var("JOBMARKET_ESCROW") {
            if !escrow.is_empty() {
                self.market.escrow_account = escrow;
            }
        }
        if let Ok(grant) = env::var("JOBMARKET_REGISTRATION_GRANT") {
            if let Ok(grant) = grant.parse() {
                self.market.registration_grant = grant;
            }
        }
        if let Ok(days) = env::var("JOBMARKET_INACTIVITY_DAYS") {
            if let Ok(days) = days.parse() {
                self.market.inactivity_days = days;
            }
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.node.data_dir.join(STATE_FILE)
    }

    pub fn administrator(&self) -> Result<AccountId> {
        parse_account(&self.market.administrator).context("market.administrator")
    }

    pub fn escrow_account(&self) -> Result<AccountId> {
        parse_account(&self.market.escrow_account).context("market.escrow_account")
    }

    /// Engine parameters in base units and seconds, validated
    pub fn market_config(&self) -> Result<MarketConfig> {
        let m = &self.market;
        let inactivity_period_secs = m
            .inactivity_days
            .checked_mul(SECONDS_PER_DAY)
            .context("market.inactivity_days out of range")?;

        let registration_grant = TokenAmount::checked_from_tokens(m.registration_grant)
            .context("market.registration_grant out of range")?;

        let config = MarketConfig {
            registration_grant,
            max_rating: m.max_rating,
            depreciation: DepreciationConfig {
                inactivity_period_secs,
                rate_none: m.rate_none,
                rate_bronze: m.rate_bronze,
                rate_silver: m.rate_silver,
                rate_gold: m.rate_gold,
            },
            badges: BadgeThresholds {
                bronze: m.bronze_threshold,
                silver: m.silver_threshold,
                gold: m.gold_threshold,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Accept a 64-digit hex id (optionally `0x`-prefixed) or derive one from a label
pub fn parse_account(value: &str) -> jobmarket_ledger::Result<AccountId> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if value.starts_with("0x") || (digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit())) {
        AccountId::from_hex(value)
    } else {
        Ok(AccountId::from_label(value))
    }
}
