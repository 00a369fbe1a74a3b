//! Single-owner access control.

use crate::error::{TokenError, TokenResult};
use alloy_primitives::Address;

/// Tracks the privileged account that may mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Creates access control owned by `owner`.
    ///
    /// Fails with [`TokenError::InvalidOwner`] for the zero address; a
    /// renounced owner can only be reached through [`Self::renounce`].
    pub fn new(owner: Address) -> TokenResult<Self> {
        if owner.is_zero() {
            return Err(TokenError::InvalidOwner);
        }
        Ok(Self { owner })
    }

    /// Restores access control from a persisted owner, which may be zero if
    /// ownership was renounced.
    pub(crate) const fn restore(owner: Address) -> Self {
        Self { owner }
    }

    /// Current owner, zero once renounced.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Fails with [`TokenError::Unauthorized`] unless `caller` is the owner.
    pub fn require_owner(&self, caller: Address) -> TokenResult<()> {
        // A renounced owner is the zero address, which no caller can be.
        if !self.owner.is_zero() && caller == self.owner {
            Ok(())
        } else {
            tracing::warn!(target: "ev_token::access", ?caller, owner = ?self.owner, "owner check failed");
            Err(TokenError::Unauthorized { caller })
        }
    }

    /// Hands ownership to `new_owner`. Returns the previous owner.
    pub fn transfer(&mut self, caller: Address, new_owner: Address) -> TokenResult<Address> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::InvalidOwner);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    /// Gives up ownership for good. Minting is impossible afterwards.
    pub fn renounce(&mut self, caller: Address) -> TokenResult<Address> {
        self.require_owner(caller)?;
        Ok(std::mem::replace(&mut self.owner, Address::ZERO))
    }
}
