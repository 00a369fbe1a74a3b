//! Balance table and total supply.

use crate::error::{TokenError, TokenResult};
use alloy_primitives::{Address, U256};
use std::collections::BTreeMap;

/// Account balances plus the total supply they sum to.
///
/// Every mutation computes the new values with checked arithmetic before
/// writing anything, so a rejected call leaves the table untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    balances: BTreeMap<Address, U256>,
    total_supply: U256,
}

/// A validated debit that has not been written yet.
///
/// Produced by [`Ledger::prepare_burn`] and applied with [`Ledger::commit_burn`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "a pending burn does nothing until committed"]
pub struct PendingBurn {
    from: Address,
    amount: U256,
    new_balance: U256,
    new_supply: U256,
}

impl PendingBurn {
    /// Account being debited.
    pub const fn from(&self) -> Address {
        self.from
    }

    /// Amount being burned.
    pub const fn amount(&self) -> U256 {
        self.amount
    }
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from a balance table, deriving the total supply.
    ///
    /// Fails with [`TokenError::Overflow`] if the balances do not fit in a
    /// `U256` total.
    pub fn from_balances(balances: BTreeMap<Address, U256>) -> TokenResult<Self> {
        let total_supply = balances
            .values()
            .try_fold(U256::ZERO, |acc, balance| acc.checked_add(*balance))
            .ok_or(TokenError::Overflow)?;
        Ok(Self { balances, total_supply })
    }

    /// Balance of `account`, zero if never seen.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Sum of all balances.
    pub const fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Iterates over every account with a recorded balance.
    pub fn balances(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.balances.iter()
    }

    /// Credits `amount` to `to`, growing the total supply.
    pub fn mint(&mut self, to: Address, amount: U256) -> TokenResult<()> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddressTarget);
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        // Cannot overflow: the balance is bounded by the supply checked above.
        let new_balance = self.balance_of(to) + amount;

        self.balances.insert(to, new_balance);
        self.total_supply = new_supply;
        Ok(())
    }

    /// Debits `amount` from `from`, shrinking the total supply.
    pub fn burn(&mut self, from: Address, amount: U256) -> TokenResult<()> {
        let pending = self.prepare_burn(from, amount)?;
        self.commit_burn(pending);
        Ok(())
    }

    /// Validates a debit without applying it.
    pub fn prepare_burn(&self, from: Address, amount: U256) -> TokenResult<PendingBurn> {
        if from.is_zero() {
            return Err(TokenError::ZeroAddressTarget);
        }

        let available = self.balance_of(from);
        let new_balance =
            available
                .checked_sub(amount)
                .ok_or(TokenError::InsufficientBalance {
                    available,
                    required: amount,
                })?;
        // Cannot underflow: amount <= balance <= supply.
        let new_supply = self.total_supply - amount;

        Ok(PendingBurn {
            from,
            amount,
            new_balance,
            new_supply,
        })
    }

    /// Applies a debit produced by [`Self::prepare_burn`].
    ///
    /// The pending burn must come from this ledger with no mutation in between.
    pub fn commit_burn(&mut self, pending: PendingBurn) {
        debug_assert_eq!(
            self.balance_of(pending.from).checked_sub(pending.amount),
            Some(pending.new_balance),
            "pending burn is stale"
        );
        self.balances.insert(pending.from, pending.new_balance);
        self.total_supply = pending.new_supply;
    }

    /// Moves `amount` from `from` to `to`. Total supply is unchanged.
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> TokenResult<()> {
        if from.is_zero() || to.is_zero() {
            return Err(TokenError::ZeroAddressTarget);
        }

        let available = self.balance_of(from);
        let new_from = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                available,
                required: amount,
            })?;

        if from == to {
            return Ok(());
        }

        // Cannot overflow: both balances are bounded by the total supply.
        let new_to = self.balance_of(to) + amount;
        self.balances.insert(from, new_from);
        self.balances.insert(to, new_to);
        Ok(())
    }
}
