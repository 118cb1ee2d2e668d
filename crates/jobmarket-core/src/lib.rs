/*!
# Job Market Engine

Token-denominated job marketplace: creators post jobs with a reward held in
escrow, registered workers take them, and the creator rates the result and
either releases payment or raises a dispute for the administrator to settle.

## Module Structure

- **market**: `JobMarket`, the state machine and the all-or-nothing call wrapper
- **escrow**: moves rewards and fees between participants and the escrow account
- **depreciation**: inactivity fee quotes
- **events**: `MarketEvent`, published after each successful call
- **snapshot**: serializable market state for persistence
- **config**: economic parameters
- **error**: `MarketError` and its categories

## Example Usage

```rust
use jobmarket_core::{JobMarket, MarketConfig};
use jobmarket_ledger::{AccountId, MemoryLedger, TokenAmount, TokenLedger};

let admin = AccountId::from_label("admin");
let escrow = AccountId::from_label("escrow");
let alice = AccountId::from_label("alice");
let bob = AccountId::from_label("bob");

let mut market = JobMarket::new(MarketConfig::default(), admin, escrow, MemoryLedger::new())?;
for account in [alice, bob] {
    market.verify(admin, account, 0)?;
    market.enroll(account, 0)?;
}

market.ledger_mut().approve(&alice, &escrow, TokenAmount::from_tokens(50))?;
let job = market.create_job(alice, "translate a README", TokenAmount::from_tokens(50), 10)?;
market.take_job(bob, job, 20)?;
market.complete_and_review_job(alice, job, 5, false, 30)?;

assert_eq!(market.ledger().balance_of(&bob), TokenAmount::from_tokens(150));
# Ok::<(), Box<dyn std::error::Error>>(())
```

## Job Lifecycle

```text
CREATED ──take──▶ TAKEN ──review──▶ COMPLETED   (worker paid)
   │                 │
 cancel           review(disputed)
   ▼                 ▼
CANCELLED         DISPUTED ──admin──▶ COMPLETED (worker paid or creator refunded)
(refunded)
```

The reward stays in escrow while a job is CREATED, TAKEN or DISPUTED, and
leaves it exactly once.

## Depreciation

```text
fee = ⌊balance × rate(badge) / 100⌋   once now - last_activity ≥ 90 days
rate: none 5%, bronze 3%, silver 2%, gold 1%
```

Charged on the caller's next create, take, complete or cancel, before the
operation's own checks. Fees are collected into the escrow account and never
paid out.
*/

pub mod config;
pub mod depreciation;
pub mod error;
pub mod escrow;
pub mod events;
pub mod market;
pub mod snapshot;
pub mod types;

pub use config::{DepreciationConfig, MarketConfig, SECONDS_PER_DAY};
pub use depreciation::DepreciationQuote;
pub use error::{ErrorCategory, MarketError, Result};
pub use escrow::EscrowVault;
pub use events::MarketEvent;
pub use market::JobMarket;
pub use snapshot::MarketSnapshot;
pub use types::*;
