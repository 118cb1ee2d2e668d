//! Identity and reputation registry for job market participants.
//!
//! Accounts are verified by an administrator, then enroll themselves. Every
//! mutating market call refreshes the caller's activity timestamp, and each
//! job completed as a worker moves the account toward the next badge:
//!
//! ```text
//! completed jobs:  0 ── 10 ── 30 ── 50 ──▶
//! badge:           none bronze silver gold
//! ```
//!
//! Badges never go down.

pub mod error;
pub mod registry;
pub mod types;

pub use error::{RegistryError, Result};
pub use registry::{CompletionUpdate, IdentityRegistry};
pub use types::{AccountRecord, Badge, BadgeThresholds, Timestamp};
