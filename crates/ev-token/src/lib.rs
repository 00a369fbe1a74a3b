//! # ev-token
//!
//! A token ledger with owner-gated minting and gas-free burns authorized by
//! EIP-712 signatures. Holders sign a `Burn` message off-chain; any relayer
//! may submit it, and the ledger executes it at most once.
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`ledger`] | Balances and total supply, checked arithmetic, staged debits |
//! | [`access`] | Single-owner access control for minting |
//! | [`nonces`] | Per-account replay counters |
//! | [`eip712`] | Domain separator, `Burn` digest, secp256k1 signer recovery |
//! | [`token`] | [`TestToken`] state container, authorized burn protocol, ABI dispatch |
//! | [`state`] | JSON snapshots of a token |
//!
//! ## Example
//!
//! ```ignore
//! use ev_token::{CallEnv, TestToken, TokenConfig};
//!
//! let mut token = TestToken::deploy(TokenConfig::default(), owner)?;
//! token.mint(&CallEnv::new(owner, now), holder, amount)?;
//!
//! // The holder signs `token.domain().burn_signing_hash(&auth)` off-chain.
//! token.burn_with_authorization(&CallEnv::new(relayer, now), &auth, &signature)?;
//! ```
//!
//! ## Guarantees
//!
//! - `total_supply` always equals the sum of balances
//! - Nonces only move forward, one step per applied authorization
//! - A rejected call writes nothing
//! - Only low-`s` signatures with `v` in `{27, 28}` are accepted

pub mod abi;
pub mod access;
pub mod config;
pub mod eip712;
pub mod error;
pub mod ledger;
pub mod nonces;
pub mod state;
pub mod token;

pub use config::{ConfigError, TokenConfig};
pub use eip712::{BurnAuthorization, SignedBurn, TokenDomain, VrsSignature};
pub use error::{TokenError, TokenResult};
pub use state::{StateError, StateFile, TokenState};
pub use token::{CallEnv, CallOutput, Receipt, TestToken, TokenEvent};
