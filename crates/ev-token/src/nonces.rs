//! Per-account replay protection counters.

use crate::error::{TokenError, TokenResult};
use alloy_primitives::{Address, U256};
use std::collections::BTreeMap;

/// Monotonic per-account nonces consumed by signed authorizations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nonces {
    nonces: BTreeMap<Address, U256>,
}

/// A checked nonce increment that has not been written yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "a pending nonce does nothing until committed"]
pub struct PendingNonce {
    account: Address,
    next: U256,
}

impl Nonces {
    /// Creates an empty table; every account starts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a table from persisted counters.
    pub(crate) const fn from_map(nonces: BTreeMap<Address, U256>) -> Self {
        Self { nonces }
    }

    /// Current nonce of `account`.
    pub fn current(&self, account: Address) -> U256 {
        self.nonces.get(&account).copied().unwrap_or_default()
    }

    /// Iterates over every account whose nonce has moved.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.nonces.iter()
    }

    /// Checks `presented` against the current nonce without consuming it.
    pub fn prepare(&self, account: Address, presented: U256) -> TokenResult<PendingNonce> {
        let expected = self.current(account);
        if presented != expected {
            return Err(TokenError::NonceMismatch {
                expected,
                presented,
            });
        }
        let next = expected
            .checked_add(U256::from(1))
            .ok_or(TokenError::Overflow)?;
        Ok(PendingNonce { account, next })
    }

    /// Writes an increment produced by [`Self::prepare`].
    pub fn commit(&mut self, pending: PendingNonce) {
        debug_assert!(pending.next > self.current(pending.account), "nonce must advance");
        self.nonces.insert(pending.account, pending.next);
    }

    /// Checks and consumes `presented`, returning the nonce that was used.
    pub fn consume(&mut self, account: Address, presented: U256) -> TokenResult<U256> {
        let pending = self.prepare(account, presented)?;
        self.commit(pending);
        Ok(presented)
    }
}
