//! The token state container and its state transitions.
//!
//! [`TestToken`] owns every piece of ledger state (balances, nonces, owner and
//! the signing domain). Each mutating operation takes `&mut self` and either
//! commits completely or returns an error with nothing written, so calls are
//! applied strictly one after another like transactions in a block.
//!
//! ## Authorized burns
//!
//! [`TestToken::burn_with_authorization`] walks the authorization through a
//! fixed sequence of gates and stops at the first failure:
//!
//! | Stage | Gate | Error |
//! |-------|------|-------|
//! | `Received` | `deadline >= now` | [`TokenError::Expired`] |
//! | `Verified` | signer of the EIP-712 digest is `from` | [`TokenError::InvalidSignature`] |
//! | `NonceChecked` | `nonce == nonces(from)` | [`TokenError::NonceMismatch`] |
//! | `Applied` | `amount <= balanceOf(from)` | [`TokenError::InsufficientBalance`] |
//!
//! The nonce increment and the debit are staged and written together once the
//! last gate passes. The caller's identity plays no part: any relayer may
//! submit a holder's signed authorization.

use crate::{
    abi::ITestToken,
    access::Ownable,
    config::{TokenConfig, DECIMALS},
    eip712::{BurnAuthorization, TokenDomain, VrsSignature},
    error::{TokenError, TokenResult},
    ledger::Ledger,
    nonces::Nonces,
};
use alloy_primitives::{keccak256, Address, Bytes, FixedBytes, LogData, B256, U256};
use alloy_sol_types::{Eip712Domain, SolCall, SolEvent, SolInterface, SolValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// ERC-5267 field bitmap: name, version, chain id and verifying contract are
/// set; salt and extensions are not.
const EIP712_DOMAIN_FIELDS: u8 = 0x0f;

/// Execution context of a single call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallEnv {
    /// Account submitting the call (`msg.sender`).
    pub caller: Address,
    /// Block timestamp the call executes at, in unix seconds.
    pub timestamp: u64,
}

impl CallEnv {
    /// Creates a call context.
    pub const fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}

/// Event emitted by a successful state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TokenEvent {
    /// Balance moved; `from` is zero on mint and `to` is zero on burn.
    Transfer {
        /// Debited account.
        from: Address,
        /// Credited account.
        to: Address,
        /// Amount moved.
        value: U256,
    },
    /// Owner changed.
    #[serde(rename_all = "camelCase")]
    OwnershipTransferred {
        /// Owner before the call.
        previous_owner: Address,
        /// Owner after the call.
        new_owner: Address,
    },
}

impl TokenEvent {
    /// EVM log encoding of the event.
    pub fn log_data(&self) -> LogData {
        match *self {
            Self::Transfer { from, to, value } => {
                ITestToken::Transfer { from, to, value }.encode_log_data()
            }
            Self::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => ITestToken::OwnershipTransferred {
                previousOwner: previous_owner,
                newOwner: new_owner,
            }
            .encode_log_data(),
        }
    }
}

/// Confirmation handle of an applied state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Position of the transition in the ledger's history, starting at 1.
    pub sequence: u64,
    /// `keccak256(sequence ‖ caller ‖ calldata)`.
    pub transaction_hash: B256,
    /// Account that submitted the call.
    pub caller: Address,
    /// Events emitted by the transition.
    pub events: Vec<TokenEvent>,
}

/// Result of [`TestToken::call`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOutput {
    /// ABI-encoded return data.
    pub output: Bytes,
    /// Receipt of the transition, `None` for views.
    pub receipt: Option<Receipt>,
}

/// Stage an authorized burn reached before it was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BurnStage {
    Received,
    Verified,
    NonceChecked,
}

/// An owner-minted token with signature-authorized burns.
#[derive(Clone, Debug)]
pub struct TestToken {
    config: TokenConfig,
    domain: TokenDomain,
    access: Ownable,
    ledger: Ledger,
    nonces: Nonces,
    sequence: u64,
}

impl TestToken {
    /// Deploys the token: `deployer` becomes owner and receives the initial
    /// supply.
    pub fn deploy(config: TokenConfig, deployer: Address) -> TokenResult<Self> {
        let access = Ownable::new(deployer)?;
        let domain = TokenDomain::new(
            config.name.clone(),
            config.version.clone(),
            config.chain_id,
            config.verifying_contract,
        );

        let mut ledger = Ledger::new();
        if !config.initial_supply.is_zero() {
            ledger.mint(deployer, config.initial_supply)?;
        }

        info!(
            target: "ev_token",
            owner = ?deployer,
            contract = ?config.verifying_contract,
            chain_id = config.chain_id,
            initial_supply = %config.initial_supply,
            separator = %domain.separator(),
            "token deployed"
        );

        Ok(Self {
            config,
            domain,
            access,
            ledger,
            nonces: Nonces::new(),
            sequence: 0,
        })
    }

    /// Reassembles a token from persisted parts. The domain separator is
    /// derived again from the config.
    pub(crate) fn from_parts(
        config: TokenConfig,
        owner: Address,
        balances: BTreeMap<Address, U256>,
        nonces: BTreeMap<Address, U256>,
        sequence: u64,
    ) -> TokenResult<Self> {
        let domain = TokenDomain::new(
            config.name.clone(),
            config.version.clone(),
            config.chain_id,
            config.verifying_contract,
        );
        Ok(Self {
            config,
            domain,
            access: Ownable::restore(owner),
            ledger: Ledger::from_balances(balances)?,
            nonces: Nonces::from_map(nonces),
            sequence,
        })
    }

    // === Views ===

    /// Token name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Token symbol.
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Always 18.
    pub const fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// Current owner, zero once renounced.
    pub const fn owner(&self) -> Address {
        self.access.owner()
    }

    /// Sum of all balances.
    pub const fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    /// Balance of `account`.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.ledger.balance_of(account)
    }

    /// Nonce the next authorization from `account` must carry.
    pub fn nonces(&self, account: Address) -> U256 {
        self.nonces.current(account)
    }

    /// The EIP-712 `DOMAIN_SEPARATOR`.
    pub const fn domain_separator(&self) -> B256 {
        self.domain.separator()
    }

    /// The signing domain in `alloy`'s form, as reported by the ERC-5267
    /// `eip712Domain()` view.
    pub fn eip712_domain(&self) -> Eip712Domain {
        self.domain.to_eip712_domain()
    }

    /// Signing domain handed to external signers.
    pub const fn domain(&self) -> &TokenDomain {
        &self.domain
    }

    /// Deployment parameters.
    pub const fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Number of transitions applied so far.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) const fn nonce_table(&self) -> &Nonces {
        &self.nonces
    }

    // === Transitions ===

    /// Owner-only: credits `amount` to `to`.
    pub fn mint(&mut self, env: &CallEnv, to: Address, amount: U256) -> TokenResult<Receipt> {
        self.access.require_owner(env.caller)?;
        self.ledger.mint(to, amount)?;

        info!(target: "ev_token", ?to, %amount, "minted");
        let calldata = ITestToken::mintCall { to, amount }.abi_encode();
        Ok(self.seal(
            env,
            &calldata,
            vec![TokenEvent::Transfer {
                from: Address::ZERO,
                to,
                value: amount,
            }],
        ))
    }

    /// Burns `amount` from the caller's own balance. No signature needed.
    pub fn burn(&mut self, env: &CallEnv, amount: U256) -> TokenResult<Receipt> {
        let from = env.caller;
        self.ledger.burn(from, amount)?;

        info!(target: "ev_token", ?from, %amount, "burned");
        let calldata = ITestToken::burnCall { amount }.abi_encode();
        Ok(self.seal(env, &calldata, vec![Self::burn_event(from, amount)]))
    }

    /// Moves `amount` from the caller to `to`.
    pub fn transfer(&mut self, env: &CallEnv, to: Address, amount: U256) -> TokenResult<Receipt> {
        let from = env.caller;
        self.ledger.transfer(from, to, amount)?;

        debug!(target: "ev_token", ?from, ?to, %amount, "transferred");
        let calldata = ITestToken::transferCall { to, amount }.abi_encode();
        Ok(self.seal(
            env,
            &calldata,
            vec![TokenEvent::Transfer {
                from,
                to,
                value: amount,
            }],
        ))
    }

    /// Owner-only: hands ownership to `new_owner`.
    pub fn transfer_ownership(&mut self, env: &CallEnv, new_owner: Address) -> TokenResult<Receipt> {
        let previous_owner = self.access.transfer(env.caller, new_owner)?;

        info!(target: "ev_token", ?previous_owner, ?new_owner, "ownership transferred");
        let calldata = ITestToken::transferOwnershipCall {
            newOwner: new_owner,
        }
        .abi_encode();
        Ok(self.seal(
            env,
            &calldata,
            vec![TokenEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            }],
        ))
    }

    /// Owner-only: gives up ownership. No one can mint afterwards.
    pub fn renounce_ownership(&mut self, env: &CallEnv) -> TokenResult<Receipt> {
        let previous_owner = self.access.renounce(env.caller)?;

        info!(target: "ev_token", ?previous_owner, "ownership renounced");
        let calldata = ITestToken::renounceOwnershipCall {}.abi_encode();
        Ok(self.seal(
            env,
            &calldata,
            vec![TokenEvent::OwnershipTransferred {
                previous_owner,
                new_owner: Address::ZERO,
            }],
        ))
    }

    /// Burns `auth.amount` from `auth.from`, authorized by `signature` over the
    /// EIP-712 digest of `auth`.
    ///
    /// Replaying an applied authorization fails with
    /// [`TokenError::NonceMismatch`] since the holder's nonce has moved on.
    /// No state is written on any failure path.
    pub fn burn_with_authorization(
        &mut self,
        env: &CallEnv,
        auth: &BurnAuthorization,
        signature: &VrsSignature,
    ) -> TokenResult<Receipt> {
        let reject = |stage: BurnStage, err: TokenError| {
            warn!(
                target: "ev_token",
                from = ?auth.from,
                relayer = ?env.caller,
                ?stage,
                %err,
                "burn authorization rejected"
            );
            err
        };

        // Received
        if auth.is_expired(env.timestamp) {
            return Err(reject(
                BurnStage::Received,
                TokenError::Expired {
                    deadline: auth.deadline,
                    now: env.timestamp,
                },
            ));
        }

        // Verified
        self.domain
            .verify(auth, signature)
            .map_err(|err| reject(BurnStage::Received, err))?;

        // NonceChecked
        let nonce = self
            .nonces
            .prepare(auth.from, auth.nonce)
            .map_err(|err| reject(BurnStage::Verified, err))?;
        let debit = self
            .ledger
            .prepare_burn(auth.from, auth.amount)
            .map_err(|err| reject(BurnStage::NonceChecked, err))?;

        // Applied: both writes or neither.
        self.nonces.commit(nonce);
        self.ledger.commit_burn(debit);

        info!(
            target: "ev_token",
            from = ?auth.from,
            relayer = ?env.caller,
            amount = %auth.amount,
            nonce = %auth.nonce,
            "authorized burn applied"
        );

        let calldata = ITestToken::burnWithSigCall {
            from: auth.from,
            amount: auth.amount,
            deadline: auth.deadline,
            v: signature.v,
            r: signature.r,
            s: signature.s,
        }
        .abi_encode();
        Ok(self.seal(env, &calldata, vec![Self::burn_event(auth.from, auth.amount)]))
    }

    /// `burnWithSig(from, amount, deadline, v, r, s)`: the authorization is
    /// taken to carry `from`'s current nonce.
    ///
    /// A replayed signature then hashes against the advanced nonce and fails
    /// with [`TokenError::InvalidSignature`].
    pub fn burn_with_sig(
        &mut self,
        env: &CallEnv,
        from: Address,
        amount: U256,
        deadline: U256,
        signature: &VrsSignature,
    ) -> TokenResult<Receipt> {
        let auth = BurnAuthorization {
            from,
            amount,
            nonce: self.nonces(from),
            deadline,
        };
        self.burn_with_authorization(env, &auth, signature)
    }

    // === ABI dispatch ===

    /// Executes ABI-encoded `input` against the token.
    ///
    /// The 4-byte selector picks the function; views return their encoded
    /// value and no receipt.
    pub fn call(&mut self, env: &CallEnv, input: &[u8]) -> TokenResult<CallOutput> {
        use ITestToken::ITestTokenCalls as Calls;

        let decoded =
            Calls::abi_decode(input).map_err(|e| TokenError::InvalidCalldata(e.to_string()))?;

        let view = |output: Vec<u8>| CallOutput {
            output: output.into(),
            receipt: None,
        };
        let applied = |receipt: Receipt, output: Bytes| CallOutput {
            output,
            receipt: Some(receipt),
        };

        let out = match decoded {
            Calls::name(_) => view(self.name().to_string().abi_encode()),
            Calls::symbol(_) => view(self.symbol().to_string().abi_encode()),
            Calls::decimals(_) => {
                view(ITestToken::decimalsCall::abi_encode_returns(&self.decimals()))
            }
            Calls::owner(_) => view(self.owner().abi_encode()),
            Calls::totalSupply(_) => view(self.total_supply().abi_encode()),
            Calls::balanceOf(call) => view(self.balance_of(call.account).abi_encode()),
            Calls::nonces(call) => view(self.nonces(call.owner).abi_encode()),
            Calls::DOMAIN_SEPARATOR(_) => view(self.domain_separator().abi_encode()),
            Calls::eip712Domain(_) => {
                let domain = self.domain();
                view(ITestToken::eip712DomainCall::abi_encode_returns(
                    &ITestToken::eip712DomainReturn {
                        fields: FixedBytes([EIP712_DOMAIN_FIELDS]),
                        name: domain.name().to_string(),
                        version: domain.version().to_string(),
                        chainId: U256::from(domain.chain_id()),
                        verifyingContract: domain.verifying_contract(),
                        salt: B256::ZERO,
                        extensions: Vec::new(),
                    },
                ))
            }
            Calls::mint(call) => applied(self.mint(env, call.to, call.amount)?, Bytes::new()),
            Calls::burn(call) => applied(self.burn(env, call.amount)?, Bytes::new()),
            Calls::burnWithSig(call) => {
                let signature = VrsSignature::new(call.v, call.r, call.s);
                let receipt =
                    self.burn_with_sig(env, call.from, call.amount, call.deadline, &signature)?;
                applied(receipt, Bytes::new())
            }
            Calls::transfer(call) => {
                let receipt = self.transfer(env, call.to, call.amount)?;
                applied(receipt, true.abi_encode().into())
            }
            Calls::transferOwnership(call) => {
                applied(self.transfer_ownership(env, call.newOwner)?, Bytes::new())
            }
            Calls::renounceOwnership(_) => {
                applied(self.renounce_ownership(env)?, Bytes::new())
            }
        };

        Ok(out)
    }

    // === Internals ===

    const fn burn_event(from: Address, amount: U256) -> TokenEvent {
        TokenEvent::Transfer {
            from,
            to: Address::ZERO,
            value: amount,
        }
    }

    /// Advances the sequence and builds the receipt of an applied transition.
    fn seal(&mut self, env: &CallEnv, calldata: &[u8], events: Vec<TokenEvent>) -> Receipt {
        self.sequence += 1;

        let mut preimage = Vec::with_capacity(8 + 20 + calldata.len());
        preimage.extend_from_slice(&self.sequence.to_be_bytes());
        preimage.extend_from_slice(env.caller.as_slice());
        preimage.extend_from_slice(calldata);

        Receipt {
            sequence: self.sequence,
            transaction_hash: keccak256(&preimage),
            caller: env.caller,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const DEPLOYER: Address = address!("0x00000000000000000000000000000000000000a1");
    const HOLDER: Address = address!("0x00000000000000000000000000000000000000b1");
    const STRANGER: Address = address!("0x00000000000000000000000000000000000000ff");
    const NOW: u64 = 1_700_000_000;

    fn deploy() -> TestToken {
        TestToken::deploy(TokenConfig::default(), DEPLOYER).unwrap()
    }

    fn env(caller: Address) -> CallEnv {
        CallEnv::new(caller, NOW)
    }

    fn tokens(n: u64) -> U256 {
        U256::from(n) * crate::config::decimals_multiplier()
    }

    #[test]
    fn deploy_sets_metadata_owner_and_supply() {
        let token = deploy();

        assert_eq!(token.name(), "TestToken");
        assert_eq!(token.symbol(), "STT");
        assert_eq!(token.decimals(), 18);
        assert_eq!(token.owner(), DEPLOYER);
        assert_eq!(token.balance_of(DEPLOYER), tokens(1000));
        assert_eq!(token.total_supply(), tokens(1000));
        assert_eq!(token.sequence(), 0);
    }

    #[test]
    fn zero_deployer_is_rejected() {
        assert_eq!(
            TestToken::deploy(TokenConfig::default(), Address::ZERO).unwrap_err(),
            TokenError::InvalidOwner
        );
    }

    #[test]
    fn owner_can_mint() {
        let mut token = deploy();
        let receipt = token.mint(&env(DEPLOYER), HOLDER, tokens(100)).unwrap();

        assert_eq!(token.balance_of(HOLDER), tokens(100));
        assert_eq!(token.total_supply(), tokens(1100));
        assert_eq!(receipt.sequence, 1);
        assert_eq!(
            receipt.events,
            vec![TokenEvent::Transfer {
                from: Address::ZERO,
                to: HOLDER,
                value: tokens(100),
            }]
        );
    }

    #[test]
    fn non_owner_cannot_mint() {
        let mut token = deploy();
        token.mint(&env(DEPLOYER), HOLDER, tokens(100)).unwrap();

        let err = token.mint(&env(HOLDER), HOLDER, tokens(100)).unwrap_err();

        assert_eq!(err, TokenError::Unauthorized { caller: HOLDER });
        assert_eq!(token.balance_of(HOLDER), tokens(100));
        assert_eq!(token.sequence(), 1);
    }

    #[test]
    fn mint_to_zero_address_is_rejected() {
        let mut token = deploy();
        assert_eq!(
            token.mint(&env(DEPLOYER), Address::ZERO, tokens(1)),
            Err(TokenError::ZeroAddressTarget)
        );
    }

    #[test]
    fn holder_burns_own_balance() {
        let mut token = deploy();
        token.mint(&env(DEPLOYER), HOLDER, tokens(100)).unwrap();

        let receipt = token.burn(&env(HOLDER), tokens(50)).unwrap();

        assert_eq!(token.balance_of(HOLDER), tokens(50));
        assert_eq!(token.total_supply(), tokens(1050));
        assert_eq!(
            receipt.events,
            vec![TokenEvent::Transfer {
                from: HOLDER,
                to: Address::ZERO,
                value: tokens(50),
            }]
        );
    }

    #[test]
    fn burn_more_than_balance_is_rejected() {
        let mut token = deploy();
        token.mint(&env(DEPLOYER), HOLDER, tokens(100)).unwrap();

        let err = token.burn(&env(HOLDER), tokens(101)).unwrap_err();

        assert!(matches!(err, TokenError::InsufficientBalance { .. }));
        assert_eq!(token.balance_of(HOLDER), tokens(100));
    }

    #[test]
    fn transfer_emits_event_and_keeps_supply() {
        let mut token = deploy();
        token.transfer(&env(DEPLOYER), HOLDER, tokens(10)).unwrap();

        assert_eq!(token.balance_of(HOLDER), tokens(10));
        assert_eq!(token.balance_of(DEPLOYER), tokens(990));
        assert_eq!(token.total_supply(), tokens(1000));
    }

    #[test]
    fn ownership_transfer_moves_mint_right() {
        let mut token = deploy();
        token.transfer_ownership(&env(DEPLOYER), HOLDER).unwrap();

        assert_eq!(token.owner(), HOLDER);
        assert!(token.mint(&env(HOLDER), STRANGER, tokens(1)).is_ok());
        assert!(token.mint(&env(DEPLOYER), STRANGER, tokens(1)).is_err());
    }

    #[test]
    fn renounce_disables_minting() {
        let mut token = deploy();
        token.renounce_ownership(&env(DEPLOYER)).unwrap();

        assert_eq!(token.owner(), Address::ZERO);
        assert_eq!(
            token.mint(&env(DEPLOYER), HOLDER, tokens(1)),
            Err(TokenError::Unauthorized { caller: DEPLOYER })
        );
    }

    #[test]
    fn expired_authorization_is_rejected_before_signature_check() {
        let mut token = deploy();
        let auth = BurnAuthorization {
            from: DEPLOYER,
            amount: tokens(1),
            nonce: U256::ZERO,
            deadline: U256::from(NOW - 1),
        };
        // Garbage signature: the deadline gate fires first.
        let signature = VrsSignature::new(0, B256::ZERO, B256::ZERO);

        let err = token
            .burn_with_authorization(&env(STRANGER), &auth, &signature)
            .unwrap_err();

        assert_eq!(
            err,
            TokenError::Expired {
                deadline: U256::from(NOW - 1),
                now: NOW,
            }
        );
        assert_eq!(token.nonces(DEPLOYER), U256::ZERO);
    }

    #[test]
    fn malformed_signature_is_rejected() {
        let mut token = deploy();
        let auth = BurnAuthorization {
            from: DEPLOYER,
            amount: tokens(1),
            nonce: U256::ZERO,
            deadline: U256::from(NOW + 60),
        };
        let signature = VrsSignature::new(27, B256::with_last_byte(1), B256::with_last_byte(1));

        assert_eq!(
            token.burn_with_authorization(&env(STRANGER), &auth, &signature),
            Err(TokenError::InvalidSignature)
        );
        assert_eq!(token.balance_of(DEPLOYER), tokens(1000));
        assert_eq!(token.sequence(), 0);
    }

    #[test]
    fn sequence_numbers_make_hashes_unique() {
        let mut token = deploy();
        let first = token.mint(&env(DEPLOYER), HOLDER, tokens(1)).unwrap();
        let second = token.mint(&env(DEPLOYER), HOLDER, tokens(1)).unwrap();

        assert_eq!(second.sequence, first.sequence + 1);
        assert_ne!(first.transaction_hash, second.transaction_hash);
    }

    #[test]
    fn transfer_event_log_uses_erc20_topic() {
        let event = TokenEvent::Transfer {
            from: DEPLOYER,
            to: HOLDER,
            value: tokens(1),
        };
        let log = event.log_data();

        assert_eq!(
            log.topics()[0],
            keccak256("Transfer(address,address,uint256)")
        );
        assert_eq!(log.topics()[1], DEPLOYER.into_word());
        assert_eq!(log.topics()[2], HOLDER.into_word());
        assert_eq!(log.data.as_ref(), tokens(1).to_be_bytes::<32>().as_slice());
    }

    #[test]
    fn call_dispatches_views() {
        let mut token = deploy();
        let caller = env(STRANGER);

        let out = token
            .call(&caller, &ITestToken::balanceOfCall { account: DEPLOYER }.abi_encode())
            .unwrap();
        assert!(out.receipt.is_none());
        assert_eq!(U256::abi_decode(&out.output).unwrap(), tokens(1000));

        let out = token
            .call(&caller, &ITestToken::decimalsCall {}.abi_encode())
            .unwrap();
        assert_eq!(
            ITestToken::decimalsCall::abi_decode_returns(&out.output).unwrap(),
            18
        );

        let out = token
            .call(&caller, &ITestToken::nameCall {}.abi_encode())
            .unwrap();
        assert_eq!(String::abi_decode(&out.output).unwrap(), "TestToken");

        let out = token
            .call(&caller, &ITestToken::DOMAIN_SEPARATORCall {}.abi_encode())
            .unwrap();
        assert_eq!(B256::abi_decode(&out.output).unwrap(), token.domain_separator());
    }

    #[test]
    fn eip712_domain_view_reports_signing_domain() {
        let mut token = deploy();

        let out = token
            .call(&env(STRANGER), &ITestToken::eip712DomainCall {}.abi_encode())
            .unwrap();
        let domain = ITestToken::eip712DomainCall::abi_decode_returns(&out.output).unwrap();

        assert!(out.receipt.is_none());
        assert_eq!(domain.fields, FixedBytes([0x0f]));
        assert_eq!(domain.name, "TestToken");
        assert_eq!(domain.version, "1");
        assert_eq!(domain.chainId, U256::from(31337u64));
        assert_eq!(domain.verifyingContract, token.config().verifying_contract);
        assert_eq!(domain.salt, B256::ZERO);
        assert!(domain.extensions.is_empty());

        assert_eq!(token.eip712_domain().separator(), token.domain_separator());
    }

    #[test]
    fn call_dispatches_mint_with_owner_check() {
        let mut token = deploy();
        let calldata = ITestToken::mintCall {
            to: HOLDER,
            amount: tokens(5),
        }
        .abi_encode();

        let out = token.call(&env(DEPLOYER), &calldata).unwrap();
        assert!(out.receipt.is_some());
        assert_eq!(token.balance_of(HOLDER), tokens(5));

        assert_eq!(
            token.call(&env(STRANGER), &calldata).unwrap_err(),
            TokenError::Unauthorized { caller: STRANGER }
        );
    }

    #[test]
    fn invalid_calldata_returns_error() {
        let mut token = deploy();
        let result = token.call(&env(DEPLOYER), &[0xde, 0xad, 0xbe, 0xef]);

        assert!(matches!(result, Err(TokenError::InvalidCalldata(_))));
    }
}
