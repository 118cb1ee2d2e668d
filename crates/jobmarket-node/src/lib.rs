pub mod config;
pub mod logging;
pub mod script;
pub mod service;

pub use config::{parse_account, LoggingConfig, MarketSettings, NodeConfig, NodeSettings};
pub use script::{load_script, parse_script, Command, CommandOutcome};
pub use service::{AccountView, MarketService, PersistedState};
