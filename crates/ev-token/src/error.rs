//! Errors raised by token state transitions.

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Errors returned by token state transitions.
///
/// Every variant is detected locally and synchronously. Retrying the same call
/// against the same state always reproduces the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Owner-only operation invoked by another account.
    #[error("unauthorized caller {caller}")]
    Unauthorized {
        /// Account that attempted the call.
        caller: Address,
    },
    /// Mint, burn or transfer addressed to the null account.
    #[error("target is the zero address")]
    ZeroAddressTarget,
    /// Debit larger than the holder's balance.
    #[error("burn amount exceeds balance: {required} > {available}")]
    InsufficientBalance {
        /// Balance held by the account.
        available: U256,
        /// Amount the call tried to debit.
        required: U256,
    },
    /// Authorization deadline is in the past.
    #[error("signature expired: deadline {deadline} < now {now}")]
    Expired {
        /// Deadline carried by the authorization.
        deadline: U256,
        /// Block timestamp the call executed at.
        now: u64,
    },
    /// Signature is malformed, non-canonical, or recovers to another account.
    #[error("invalid signature")]
    InvalidSignature,
    /// Presented nonce is not the account's current nonce.
    #[error("nonce mismatch: expected {expected}, got {presented}")]
    NonceMismatch {
        /// Current nonce of the account.
        expected: U256,
        /// Nonce carried by the authorization.
        presented: U256,
    },
    /// Total supply would exceed `U256::MAX`.
    #[error("total supply overflow")]
    Overflow,
    /// Ownership handed to the null account.
    #[error("invalid owner")]
    InvalidOwner,
    /// Calldata could not be decoded against the token interface.
    #[error("invalid calldata: {0}")]
    InvalidCalldata(String),
}

impl TokenError {
    /// Returns true when the error stems from caller input rather than from the
    /// ledger itself. Front-ends map these to client errors.
    pub const fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Overflow)
    }
}

/// Result alias for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
