//! JSON snapshots of a token's state.

use crate::{
    config::{ConfigError, TokenConfig},
    error::TokenError,
    token::TestToken,
};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Serializable snapshot of a [`TestToken`].
///
/// The domain separator and total supply are not stored; both are derived
/// again when the snapshot is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenState {
    /// Deployment parameters.
    pub config: TokenConfig,
    /// Current owner.
    pub owner: Address,
    /// Non-zero and previously touched balances.
    #[serde(default)]
    pub balances: BTreeMap<Address, U256>,
    /// Nonces that have moved past zero.
    #[serde(default)]
    pub nonces: BTreeMap<Address, U256>,
    /// Transitions applied so far.
    #[serde(default)]
    pub sequence: u64,
}

impl From<&TestToken> for TokenState {
    fn from(token: &TestToken) -> Self {
        Self {
            config: token.config().clone(),
            owner: token.owner(),
            balances: token
                .ledger()
                .balances()
                .map(|(account, balance)| (*account, *balance))
                .collect(),
            nonces: token
                .nonce_table()
                .iter()
                .map(|(account, nonce)| (*account, *nonce))
                .collect(),
            sequence: token.sequence(),
        }
    }
}

impl TryFrom<TokenState> for TestToken {
    type Error = StateError;

    fn try_from(state: TokenState) -> Result<Self, Self::Error> {
        state.config.validate()?;
        Ok(Self::from_parts(
            state.config,
            state.owner,
            state.balances,
            state.nonces,
            state.sequence,
        )?)
    }
}

/// Errors raised while loading or storing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Reading or writing the file failed.
    #[error("state file {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The snapshot is not valid JSON.
    #[error("malformed state: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot's config is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The snapshot violates a ledger invariant.
    #[error("inconsistent state: {0}")]
    Ledger(#[from] TokenError),
}

/// A token snapshot stored as a JSON file.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Points at `path`; nothing is read until [`Self::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads and rebuilds the token.
    pub fn load(&self) -> Result<TestToken, StateError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StateError::Io {
            path: self.path.clone(),
            source,
        })?;
        let state: TokenState = serde_json::from_str(&raw)?;
        tracing::debug!(target: "ev_token::state", path = %self.path.display(), sequence = state.sequence, "state loaded");
        TestToken::try_from(state)
    }

    /// Writes a snapshot of `token`, replacing the previous file atomically.
    pub fn store(&self, token: &TestToken) -> Result<(), StateError> {
        let raw = serde_json::to_string_pretty(&TokenState::from(token))?;
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, raw).map_err(io_err)?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(source));
        }
        tracing::debug!(target: "ev_token::state", path = %self.path.display(), sequence = token.sequence(), "state stored");
        Ok(())
    }
}
