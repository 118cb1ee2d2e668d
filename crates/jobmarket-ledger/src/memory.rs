use crate::error::{LedgerError, Result};
use crate::ledger::TokenLedger;
use crate::types::{AccountId, TokenAmount, TransferKind, TransferRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

type BalanceMap = BTreeMap<AccountId, TokenAmount>;
type AllowanceMap = BTreeMap<AccountId, BTreeMap<AccountId, TokenAmount>>;

#[derive(Debug, Clone)]
struct LedgerBackup {
    balances: BalanceMap,
    allowances: AllowanceMap,
    total_supply: TokenAmount,
    history_len: usize,
}

/// In-memory token ledger with snapshot-based transactions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryLedger {
    balances: BalanceMap,
    allowances: AllowanceMap,
    total_supply: TokenAmount,
    history: Vec<TransferRecord>,
    #[serde(skip)]
    backup: Option<LedgerBackup>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[TransferRecord] {
        &self.history
    }

    /// Committed movements touching `account`
    pub fn history_for(&self, account: &AccountId) -> Vec<&TransferRecord> {
        self.history
            .iter()
            .filter(|r| r.to == *account || r.from.as_ref() == Some(account))
            .collect()
    }

    pub fn accounts(&self) -> Vec<AccountId> {
        self.balances.keys().copied().collect()
    }

    pub fn in_transaction(&self) -> bool {
        self.backup.is_some()
    }

    fn set_balance(&mut self, account: AccountId, balance: TokenAmount) {
        if balance.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }

    fn move_tokens(&mut self, from: &AccountId, to: &AccountId, amount: TokenAmount) -> Result<()> {
        if from == to {
            return Err(LedgerError::SelfTransfer(*from));
        }

        let from_balance = self.balance_of(from);
        let new_from_balance =
            from_balance
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientBalance {
                    account: *from,
                    needed: amount,
                    available: from_balance,
                })?;
        let to_balance = self.balance_of(to);
        let new_to_balance = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;

        self.set_balance(*from, new_from_balance);
        self.set_balance(*to, new_to_balance);

        debug!(
            from = %from.short(),
            to = %to.short(),
            amount = amount.to_base_units(),
            from_balance_after = new_from_balance.to_base_units(),
            to_balance_after = new_to_balance.to_base_units(),
            "💸 Executing transfer"
        );
        Ok(())
    }

    fn record(&mut self, from: Option<AccountId>, to: AccountId, amount: TokenAmount, kind: TransferKind) {
        let sequence = self.history.len() as u64;

        let mut hasher = blake3::Hasher::new();
        if let Some(from) = &from {
            hasher.update(from.as_bytes());
        }
        hasher.update(to.as_bytes());
        hasher.update(&amount.to_base_units().to_le_bytes());
        hasher.update(&sequence.to_le_bytes());
        let tx_hash = hex::encode(hasher.finalize().as_bytes());

        self.history.push(TransferRecord {
            sequence,
            from,
            to,
            amount,
            kind,
            tx_hash,
        });
    }
}

impl TokenLedger for MemoryLedger {
    fn balance_of(&self, account: &AccountId) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or(TokenAmount::ZERO)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> TokenAmount {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: TokenAmount,
    ) -> Result<()> {
        let approvals = self.allowances.entry(*owner).or_default();
        if amount.is_zero() {
            approvals.remove(spender);
        } else {
            approvals.insert(*spender, amount);
        }
        if approvals.is_empty() {
            self.allowances.remove(owner);
        }

        info!(
            owner = %owner.short(),
            spender = %spender.short(),
            amount = amount.to_base_units(),
            "✍️ Allowance approved"
        );
        Ok(())
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: TokenAmount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.move_tokens(from, to, amount)?;
        self.record(Some(*from), *to, amount, TransferKind::Transfer);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: TokenAmount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let approved = self.allowance(from, spender);
        let remaining = approved
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                needed: amount,
                approved,
            })?;

        self.move_tokens(from, to, amount)?;
        self.approve(from, spender, remaining)?;
        self.record(Some(*from), *to, amount, TransferKind::TransferFrom);
        Ok(())
    }

    fn mint(&mut self, to: &AccountId, amount: TokenAmount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;

        self.total_supply = new_supply;
        self.set_balance(*to, new_balance);
        self.record(None, *to, amount, TransferKind::Mint);

        info!(
            to = %to.short(),
            amount = amount.to_base_units(),
            balance_after = new_balance.to_base_units(),
            "💰 Tokens minted"
        );
        Ok(())
    }

    fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.backup.is_some() {
            return Err(LedgerError::TransactionInProgress);
        }
        self.backup = Some(LedgerBackup {
            balances: self.balances.clone(),
            allowances: self.allowances.clone(),
            total_supply: self.total_supply,
            history_len: self.history.len(),
        });
        debug!(accounts = self.balances.len(), "📝 Ledger transaction began");
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.backup.take().ok_or(LedgerError::NoTransaction)?;
        debug!("✅ Ledger transaction committed");
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let backup = self.backup.take().ok_or(LedgerError::NoTransaction)?;
        let reverted = self.history.len() - backup.history_len;

        self.balances = backup.balances;
        self.allowances = backup.allowances;
        self.total_supply = backup.total_supply;
        self.history.truncate(backup.history_len);

        info!(reverted_transfers = reverted, "🔄 Ledger transaction rolled back");
        Ok(())
    }
}
