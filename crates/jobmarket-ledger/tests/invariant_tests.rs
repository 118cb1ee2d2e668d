use jobmarket_ledger::{AccountId, MemoryLedger, TokenAmount, TokenLedger};
use proptest::prelude::*;

fn accounts() -> Vec<AccountId> {
    (0u8..4).map(|i| AccountId::from_bytes([i + 1; 32])).collect()
}

fn sum_of_balances(ledger: &MemoryLedger, accounts: &[AccountId]) -> u64 {
    accounts
        .iter()
        .map(|a| ledger.balance_of(a).to_base_units())
        .sum()
}

proptest! {
    /// Transfers conserve the total supply whether they succeed or fail
    #[test]
    fn prop_transfers_conserve_supply(
        moves in prop::collection::vec((0usize..4, 0usize..4, 0u64..2_000), 1..40)
    ) {
        let accounts = accounts();
        let mut ledger = MemoryLedger::new();
        for account in &accounts {
            ledger.mint(account, TokenAmount::from_base_units(1_000)).unwrap();
        }

        for (from, to, amount) in moves {
            let _ = ledger.transfer(&accounts[from], &accounts[to], TokenAmount::from_base_units(amount));
            prop_assert_eq!(sum_of_balances(&ledger, &accounts), 4_000);
        }
        prop_assert_eq!(ledger.total_supply().to_base_units(), 4_000);
    }

    /// A rolled back transaction leaves no trace
    #[test]
    fn prop_rollback_is_exact(
        moves in prop::collection::vec((0usize..4, 0usize..4, 1u64..500), 1..20)
    ) {
        let accounts = accounts();
        let mut ledger = MemoryLedger::new();
        for account in &accounts {
            ledger.mint(account, TokenAmount::from_base_units(1_000)).unwrap();
        }
        let before: Vec<_> = accounts.iter().map(|a| ledger.balance_of(a)).collect();
        let history_before = ledger.history().len();

        ledger.begin_transaction().unwrap();
        for (from, to, amount) in moves {
            let _ = ledger.transfer(&accounts[from], &accounts[to], TokenAmount::from_base_units(amount));
        }
        ledger.rollback_transaction().unwrap();

        let after: Vec<_> = accounts.iter().map(|a| ledger.balance_of(a)).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(ledger.history().len(), history_before);
    }
}

#[test]
fn test_ledger_serde_roundtrip_keeps_allowances() {
    let alice = AccountId::from_label("alice");
    let escrow = AccountId::from_label("escrow");
    let mut ledger = MemoryLedger::new();
    ledger.mint(&alice, TokenAmount::from_tokens(100)).unwrap();
    ledger.approve(&alice, &escrow, TokenAmount::from_tokens(40)).unwrap();

    let json = serde_json::to_string(&ledger).unwrap();
    let restored: MemoryLedger = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.balance_of(&alice), TokenAmount::from_tokens(100));
    assert_eq!(restored.allowance(&alice, &escrow), TokenAmount::from_tokens(40));
    assert_eq!(restored.history().len(), 1);
}
