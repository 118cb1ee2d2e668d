use crate::error::{LedgerError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const TOKEN_DECIMALS: u32 = 2;
pub const UNITS_PER_TOKEN: u64 = 100; // 10^2
pub const TOKEN_SYMBOL: &str = "JMT";

/// Token amount in base units (one whole token = 100 units)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u64);

impl TokenAmount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u64::MAX);

    pub const fn from_tokens(tokens: u64) -> Self {
        Self(tokens.saturating_mul(UNITS_PER_TOKEN))
    }

    /// Like `from_tokens`, but `None` when the unit count does not fit
    pub const fn checked_from_tokens(tokens: u64) -> Option<Self> {
        match tokens.checked_mul(UNITS_PER_TOKEN) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }

    pub const fn from_base_units(units: u64) -> Self {
        Self(units)
    }

    pub const fn to_base_units(&self) -> u64 {
        self.0
    }

    /// Whole-token view for logging only
    pub fn to_tokens(&self) -> f64 {
        self.0 as f64 / UNITS_PER_TOKEN as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `⌊self × percent / 100⌋`, truncating toward zero. `None` above 100%.
    pub fn checked_percent(&self, percent: u8) -> Option<Self> {
        if percent > 100 {
            return None;
        }
        let scaled = (self.0 as u128 * percent as u128) / 100;
        u64::try_from(scaled).ok().map(Self)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.0 / UNITS_PER_TOKEN,
            self.0 % UNITS_PER_TOKEN,
            TOKEN_SYMBOL
        )
    }
}

/// 32-byte account identifier, rendered as lowercase hex
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Deterministic id derived from a human label ("alice", "escrow", ...)
    pub fn from_label(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"jobmarket-account:");
        hasher.update(label.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed)
            .map_err(|e| LedgerError::InvalidAccountId(format!("{}: {}", s, e)))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            LedgerError::InvalidAccountId(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 bytes, for log fields
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl FromStr for AccountId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId(0x{})", self.short())
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Why tokens moved, recorded in the ledger history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Mint,
    Transfer,
    TransferFrom,
}

/// One committed token movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub sequence: u64,
    pub from: Option<AccountId>,
    pub to: AccountId,
    pub amount: TokenAmount,
    pub kind: TransferKind,
    pub tx_hash: String,
}
