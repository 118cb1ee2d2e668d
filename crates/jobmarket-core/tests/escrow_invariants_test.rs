use jobmarket_core::{JobId, JobMarket, JobStatus, MarketConfig, SECONDS_PER_DAY};
use jobmarket_ledger::{AccountId, MemoryLedger, TokenAmount, TokenLedger};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Approve { who: usize, units: u64 },
    Create { who: usize, units: u64 },
    Take { who: usize, job: u64 },
    Review { who: usize, job: u64, rating: u8, disputed: bool },
    Cancel { who: usize, job: u64 },
    Resolve { job: u64, for_worker: bool },
    Wait { days: i64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 0..5_000u64).prop_map(|(who, units)| Op::Approve { who, units }),
        (0..3usize, 0..3_000u64).prop_map(|(who, units)| Op::Create { who, units }),
        (0..3usize, 0..8u64).prop_map(|(who, job)| Op::Take { who, job }),
        (0..3usize, 0..8u64, 0..7u8, any::<bool>()).prop_map(|(who, job, rating, disputed)| {
            Op::Review {
                who,
                job,
                rating,
                disputed,
            }
        }),
        (0..3usize, 0..8u64).prop_map(|(who, job)| Op::Cancel { who, job }),
        (0..8u64, any::<bool>()).prop_map(|(job, for_worker)| Op::Resolve { job, for_worker }),
        (0..120i64).prop_map(|days| Op::Wait { days }),
    ]
}

fn apply(
    market: &mut JobMarket<MemoryLedger>,
    accounts: &[AccountId],
    admin: AccountId,
    now: &mut i64,
    op: Op,
) {
    *now += 1;
    let _: jobmarket_core::Result<()> = match op {
        Op::Approve { who, units } => {
            let escrow = market.escrow_account();
            market
                .ledger_mut()
                .approve(&accounts[who], &escrow, TokenAmount::from_base_units(units))
                .map_err(Into::into)
        }
        Op::Create { who, units } => market
            .create_job(accounts[who], "job", TokenAmount::from_base_units(units), *now)
            .map(|_| ()),
        Op::Take { who, job } => market.take_job(accounts[who], JobId(job), *now),
        Op::Review {
            who,
            job,
            rating,
            disputed,
        } => market
            .complete_and_review_job(accounts[who], JobId(job), rating, disputed, *now)
            .map(|_| ()),
        Op::Cancel { who, job } => market.cancel_job(accounts[who], JobId(job), *now),
        Op::Resolve { job, for_worker } => market
            .handle_disputed_job(admin, JobId(job), for_worker, *now)
            .map(|_| ()),
        Op::Wait { days } => {
            *now += days * SECONDS_PER_DAY;
            Ok(())
        }
    };
}

proptest! {
    #[test]
    fn prop_escrow_accounting_holds(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let admin = AccountId::from_label("admin");
        let escrow = AccountId::from_label("escrow");
        let accounts: Vec<AccountId> = ["a", "b", "c"].iter().map(|l| AccountId::from_label(l)).collect();

        let mut market =
            JobMarket::new(MarketConfig::default(), admin, escrow, MemoryLedger::new()).unwrap();
        for account in &accounts {
            market.verify(admin, *account, 0).unwrap();
            market.enroll(*account, 0).unwrap();
        }
        let supply = market.ledger().total_supply();

        let mut now = 0;
        for op in ops {
            apply(&mut market, &accounts, admin, &mut now, op);

            let totals = market.totals();
            prop_assert!(!market.ledger().in_transaction());
            prop_assert_eq!(market.ledger().total_supply(), supply);

            // Escrow holds open rewards plus every fee ever collected
            let expected_escrow = market
                .escrowed_total()
                .checked_add(totals.depreciation_collected)
                .unwrap();
            prop_assert_eq!(market.ledger().balance_of(&escrow), expected_escrow);

            // Each settled job released its reward exactly once
            let mut paid = TokenAmount::ZERO;
            let mut refunded = TokenAmount::ZERO;
            for job in market.jobs() {
                match job.status {
                    JobStatus::Completed => match job.resolution {
                        Some(jobmarket_core::DisputeResolution::CreatorRefunded) => {
                            refunded = refunded.checked_add(job.reward).unwrap()
                        }
                        _ => paid = paid.checked_add(job.reward).unwrap(),
                    },
                    JobStatus::Cancelled => refunded = refunded.checked_add(job.reward).unwrap(),
                    JobStatus::Taken | JobStatus::Disputed => prop_assert!(job.worker.is_some()),
                    JobStatus::Created => prop_assert!(job.worker.is_none()),
                }
            }
            prop_assert_eq!(totals.paid_out, paid);
            prop_assert_eq!(totals.refunded, refunded);

            for account in &accounts {
                let record = market.account(account).unwrap();
                prop_assert!(record.registered && record.verified);
            }
        }
    }

    #[test]
    fn prop_job_ids_never_reused(rewards in prop::collection::vec(0..200u64, 1..20)) {
        let admin = AccountId::from_label("admin");
        let escrow = AccountId::from_label("escrow");
        let a = AccountId::from_label("a");

        let mut market =
            JobMarket::new(MarketConfig::default(), admin, escrow, MemoryLedger::new()).unwrap();
        market.verify(admin, a, 0).unwrap();
        market.enroll(a, 0).unwrap();
        market
            .ledger_mut()
            .approve(&a, &escrow, TokenAmount::from_tokens(100))
            .unwrap();

        let mut expected = 0u64;
        for (i, units) in rewards.into_iter().enumerate() {
            let id = market
                .create_job(a, "job", TokenAmount::from_base_units(units), i as i64)
                .unwrap();
            prop_assert_eq!(id, JobId(expected));
            expected += 1;
            if i % 2 == 0 {
                market.cancel_job(a, id, i as i64).unwrap();
            }
        }
        prop_assert_eq!(market.next_job_id(), JobId(expected));
    }
}
