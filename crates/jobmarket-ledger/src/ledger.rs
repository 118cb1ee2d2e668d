use crate::error::Result;
use crate::types::{AccountId, TokenAmount};

/// Narrow view of a fungible-token ledger.
///
/// The market engine is a spender authorized by users through `approve`; it
/// pulls escrow with `transfer_from` and pays out from its own account with
/// `transfer`. `mint` backs the one-time registration grant.
///
/// Every mutating market call brackets its ledger movements with
/// `begin_transaction` / `commit_transaction`, and calls
/// `rollback_transaction` when any later step fails.
pub trait TokenLedger: Send {
    fn balance_of(&self, account: &AccountId) -> TokenAmount;

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> TokenAmount;

    fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: TokenAmount)
        -> Result<()>;

    /// Move `amount` from `from` (the signer) to `to`
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: TokenAmount) -> Result<()>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: TokenAmount,
    ) -> Result<()>;

    fn mint(&mut self, to: &AccountId, amount: TokenAmount) -> Result<()>;

    fn total_supply(&self) -> TokenAmount;

    fn begin_transaction(&mut self) -> Result<()>;
    fn commit_transaction(&mut self) -> Result<()>;
    fn rollback_transaction(&mut self) -> Result<()>;
}
