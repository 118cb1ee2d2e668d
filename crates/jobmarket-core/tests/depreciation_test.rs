use jobmarket_core::{
    JobId, JobMarket, JobStatus, MarketConfig, MarketError, MarketEvent, SECONDS_PER_DAY,
};
use jobmarket_ledger::{AccountId, MemoryLedger, TokenAmount, TokenLedger};
use jobmarket_registry::Badge;

const DORMANT: i64 = 90 * SECONDS_PER_DAY;

fn units(n: u64) -> TokenAmount {
    TokenAmount::from_base_units(n)
}

struct Fixture {
    market: JobMarket<MemoryLedger>,
    admin: AccountId,
    escrow: AccountId,
}

impl Fixture {
    fn new() -> Self {
        let admin = AccountId::from_label("admin");
        let escrow = AccountId::from_label("escrow");
        Self {
            market: JobMarket::new(MarketConfig::default(), admin, escrow, MemoryLedger::new())
                .unwrap(),
            admin,
            escrow,
        }
    }

    fn register(&mut self, label: &str, now: i64) -> AccountId {
        let account = AccountId::from_label(label);
        self.market.verify(self.admin, account, now).unwrap();
        self.market.enroll(account, now).unwrap();
        account
    }

    fn approve(&mut self, owner: AccountId, amount: TokenAmount) {
        let escrow = self.escrow;
        self.market
            .ledger_mut()
            .approve(&owner, &escrow, amount)
            .unwrap();
    }

    fn balance(&self, account: &AccountId) -> TokenAmount {
        self.market.ledger().balance_of(account)
    }

    fn allowance(&self, owner: &AccountId) -> TokenAmount {
        self.market.ledger().allowance(owner, &self.escrow)
    }

    fn last_activity(&self, account: &AccountId) -> i64 {
        self.market.account(account).unwrap().last_activity
    }
}

#[test]
fn test_dormant_creator_pays_fee_and_reward() {
    let mut f = Fixture::new();
    let a = f.register("a", 0);
    assert_eq!(f.balance(&a), units(10_000));
    f.approve(a, units(1_500));

    let job = f.market.create_job(a, "dormant", units(1_000), DORMANT).unwrap();

    assert_eq!(f.balance(&a), units(8_500));
    assert_eq!(f.allowance(&a), TokenAmount::ZERO);
    assert_eq!(f.balance(&f.escrow), units(1_500));
    assert_eq!(f.market.escrowed_total(), units(1_000));
    assert_eq!(f.market.totals().depreciation_collected, units(500));
    assert_eq!(f.market.job(job).unwrap().reward, units(1_000));
    assert_eq!(f.last_activity(&a), DORMANT);
    assert!(!f.market.quote_depreciation(&a, DORMANT + 1).unwrap().is_due());
}

#[test]
fn test_allowance_one_unit_short_fails_whole_call() {
    let mut f = Fixture::new();
    let a = f.register("a", 0);
    f.approve(a, units(1_499));
    f.market.drain_events();

    let err = f
        .market
        .create_job(a, "dormant", units(1_000), DORMANT)
        .unwrap_err();

    assert_eq!(
        err,
        MarketError::InsufficientAllowance {
            required: units(1_500)
        }
    );
    assert_eq!(f.balance(&a), units(10_000));
    assert_eq!(f.allowance(&a), units(1_499));
    assert_eq!(f.balance(&f.escrow), TokenAmount::ZERO);
    assert_eq!(f.last_activity(&a), 0);
    assert_eq!(f.market.next_job_id(), JobId(0));
    assert!(f.market.drain_events().is_empty());
    assert_eq!(f.market.totals().depreciation_collected, TokenAmount::ZERO);
}

#[test]
fn test_funds_checked_before_allowance() {
    let mut f = Fixture::new();
    let a = f.register("a", 0);

    // No allowance at all, yet the funds shortfall is what gets reported
    let err = f
        .market
        .create_job(a, "too big", units(9_600), DORMANT)
        .unwrap_err();
    assert_eq!(
        err,
        MarketError::InsufficientFunds {
            required: units(10_100)
        }
    );
}

#[test]
fn test_fee_rolled_back_when_transition_fails() {
    let mut f = Fixture::new();
    let creator = f.register("creator", DORMANT);
    let worker = f.register("worker", DORMANT);
    let late = f.register("late", 0);
    f.approve(creator, units(100));
    f.approve(late, units(500));

    let job = f.market.create_job(creator, "x", units(100), DORMANT).unwrap();
    f.market.take_job(worker, job, DORMANT + 1).unwrap();

    // `late` is dormant and can pay, but the job is already taken
    let err = f.market.take_job(late, job, DORMANT + 2).unwrap_err();
    assert!(matches!(
        err,
        MarketError::JobStatusIncorrect {
            current: JobStatus::Taken,
            ..
        }
    ));
    assert_eq!(f.balance(&late), units(10_000));
    assert_eq!(f.allowance(&late), units(500));
    assert_eq!(f.last_activity(&late), 0);
    assert!(f.market.quote_depreciation(&late, DORMANT + 2).unwrap().is_due());
}

#[test]
fn test_fee_charged_once_then_countdown_resets() {
    let mut f = Fixture::new();
    let creator = f.register("creator", DORMANT);
    let worker = f.register("worker", 0);
    f.approve(creator, units(200));
    f.approve(worker, units(500));

    let first = f.market.create_job(creator, "1", units(100), DORMANT).unwrap();
    let second = f.market.create_job(creator, "2", units(100), DORMANT).unwrap();

    f.market.take_job(worker, first, DORMANT).unwrap();
    assert_eq!(f.balance(&worker), units(9_500));
    assert_eq!(f.allowance(&worker), TokenAmount::ZERO);

    // Activity was refreshed, so the next call is free even with no allowance
    f.market.take_job(worker, second, DORMANT + 1).unwrap();
    assert_eq!(f.balance(&worker), units(9_500));

    let charged: Vec<_> = f
        .market
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, MarketEvent::DepreciationCharged { .. }))
        .collect();
    assert_eq!(charged.len(), 1);
    match &charged[0] {
        MarketEvent::DepreciationCharged {
            account,
            amount,
            rate_percent,
            ..
        } => {
            assert_eq!(*account, worker);
            assert_eq!(*amount, units(500));
            assert_eq!(*rate_percent, 5);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_not_charged_one_second_early() {
    let mut f = Fixture::new();
    let a = f.register("a", 0);
    f.approve(a, units(1_000));

    f.market.create_job(a, "x", units(1_000), DORMANT - 1).unwrap();
    assert_eq!(f.balance(&a), units(9_000));
    assert_eq!(f.market.totals().depreciation_collected, TokenAmount::ZERO);
}

#[test]
fn test_bronze_worker_pays_reduced_rate() {
    let mut f = Fixture::new();
    let creator = f.register("creator", 0);
    let worker = f.register("worker", 0);
    f.approve(creator, units(1_000));

    for i in 0..10 {
        let job = f.market.create_job(creator, "small", units(100), i).unwrap();
        f.market.take_job(worker, job, i).unwrap();
        f.market
            .complete_and_review_job(creator, job, 5, false, i)
            .unwrap();
    }
    assert_eq!(f.market.account(&worker).unwrap().badge, Badge::Bronze);
    assert_eq!(f.balance(&worker), units(11_000));

    let last = f.last_activity(&worker);
    let now = last + DORMANT;
    let quote = f.market.quote_depreciation(&worker, now).unwrap();
    assert_eq!(quote.rate_percent, 3);
    assert_eq!(quote.amount, units(330));

    // The creator went quiet at the same time; post just before their fee kicks in
    f.approve(creator, units(100));
    let job = f
        .market
        .create_job(creator, "after", units(100), now - 1)
        .unwrap();
    f.approve(worker, units(330));
    f.market.take_job(worker, job, now).unwrap();
    assert_eq!(f.balance(&worker), units(10_670));
}

#[test]
fn test_fee_truncates_toward_zero() {
    let mut f = Fixture::new();
    let a = f.register("a", 0);
    let sink = AccountId::from_label("sink");
    // Leave 19 units: 5% of 19 is 0.95, truncated to 0
    f.market
        .ledger_mut()
        .transfer(&a, &sink, units(9_981))
        .unwrap();

    let quote = f.market.quote_depreciation(&a, DORMANT).unwrap();
    assert_eq!(quote.rate_percent, 5);
    assert_eq!(quote.amount, TokenAmount::ZERO);

    f.approve(a, units(19));
    f.market.create_job(a, "x", units(19), DORMANT).unwrap();
    assert_eq!(f.balance(&a), TokenAmount::ZERO);
}

#[test]
fn test_administrative_calls_skip_depreciation() {
    let mut f = Fixture::new();
    let admin = f.admin;
    f.market.ledger_mut().mint(&admin, units(10_000)).unwrap();

    let late = AccountId::from_label("late");
    f.market.verify(admin, late, 10 * DORMANT).unwrap();
    assert_eq!(f.balance(&admin), units(10_000));
}

mod arithmetic {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_exact_fee_and_headroom(
            extra in 0..1_000_000_000u64,
            expense in 0..10_000u64,
            idle_days in 90..400i64,
            exact in any::<bool>(),
        ) {
            let mut f = Fixture::new();
            let a = f.register("a", 0);
            f.market.ledger_mut().mint(&a, units(extra)).unwrap();

            let balance = 10_000 + extra;
            let fee = balance * 5 / 100;
            let required = fee + expense;
            prop_assume!(required <= balance && required > 0);

            let approved = if exact { required } else { required - 1 };
            f.approve(a, units(approved));
            let now = idle_days * SECONDS_PER_DAY;
            let result = f.market.create_job(a, "p", units(expense), now);

            if exact {
                prop_assert!(result.is_ok());
                prop_assert_eq!(f.balance(&a), units(balance - required));
                prop_assert_eq!(f.market.totals().depreciation_collected, units(fee));
            } else {
                prop_assert_eq!(
                    result.unwrap_err(),
                    MarketError::InsufficientAllowance { required: units(required) }
                );
                prop_assert_eq!(f.balance(&a), units(balance));
            }
        }
    }
}
