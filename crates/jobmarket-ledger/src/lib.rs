pub mod error;
pub mod ledger;
pub mod memory;
pub mod types;

pub use error::{LedgerError, Result};
pub use ledger::TokenLedger;
pub use memory::MemoryLedger;
pub use types::{
    AccountId, TokenAmount, TransferKind, TransferRecord, TOKEN_DECIMALS, TOKEN_SYMBOL,
    UNITS_PER_TOKEN,
};
