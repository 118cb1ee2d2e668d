use jobmarket_ledger::{AccountId, Result, TokenAmount, TokenLedger};
use tracing::info;

/// The market's own account on the token ledger.
///
/// Rewards are pulled in with the escrow account acting as spender, and paid
/// back out with plain transfers signed by the escrow account. Depreciation
/// fees land here too and are never paid out.
pub struct EscrowVault<'a, L: TokenLedger> {
    ledger: &'a mut L,
    account: AccountId,
}

impl<'a, L: TokenLedger> EscrowVault<'a, L> {
    pub fn new(ledger: &'a mut L, account: AccountId) -> Self {
        Self { ledger, account }
    }

    /// Pull `amount` from `owner` into escrow using the owner's allowance
    pub fn lock(&mut self, owner: &AccountId, amount: TokenAmount) -> Result<()> {
        let balance_before = self.ledger.balance_of(owner);
        self.ledger
            .transfer_from(&self.account, owner, &self.account, amount)?;

        info!(
            owner = %owner.short(),
            amount = amount.to_base_units(),
            balance_before = balance_before.to_base_units(),
            escrow_balance = self.ledger.balance_of(&self.account).to_base_units(),
            "🔒 Escrow locked"
        );
        Ok(())
    }

    /// Pay `amount` out of escrow to a worker
    pub fn release(&mut self, to: &AccountId, amount: TokenAmount) -> Result<()> {
        self.ledger.transfer(&self.account, to, amount)?;

        info!(
            to = %to.short(),
            amount = amount.to_base_units(),
            to_balance_after = self.ledger.balance_of(to).to_base_units(),
            "💸 Escrow released"
        );
        Ok(())
    }

    /// Return `amount` from escrow to the job creator
    pub fn refund(&mut self, creator: &AccountId, amount: TokenAmount) -> Result<()> {
        self.ledger.transfer(&self.account, creator, amount)?;

        info!(
            creator = %creator.short(),
            amount = amount.to_base_units(),
            creator_balance_after = self.ledger.balance_of(creator).to_base_units(),
            "🔄 Escrow refunded"
        );
        Ok(())
    }

    /// Collect an inactivity fee; it stays in escrow as a sink
    pub fn collect_fee(&mut self, from: &AccountId, amount: TokenAmount) -> Result<()> {
        self.ledger
            .transfer_from(&self.account, from, &self.account, amount)
    }
}
