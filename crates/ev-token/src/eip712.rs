//! EIP-712 hashing and signer recovery for burn authorizations.
//!
//! The digest a holder signs is built in two stages:
//!
//! ```text
//! struct_hash = keccak256(BURN_TYPEHASH ‖ from ‖ amount ‖ nonce ‖ deadline)
//! digest      = keccak256(0x19 ‖ 0x01 ‖ domain_separator ‖ struct_hash)
//! ```
//!
//! Each field is ABI-encoded as a 32-byte word, so the digest matches what
//! `eth_signTypedData_v4` wallets produce for the `Burn` primary type.

use crate::{
    abi,
    error::{TokenError, TokenResult},
};
use alloy_primitives::{keccak256, uint, Address, Signature, B256, U256};
use alloy_sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, sync::OnceLock};

/// Canonical type string of the domain struct.
pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Canonical type string of the burn message.
pub const BURN_TYPE: &str = "Burn(address from,uint256 amount,uint256 nonce,uint256 deadline)";

/// Half the secp256k1 group order. Signatures with a larger `s` are the
/// malleable twin of a canonical one and are rejected.
pub const SECP256K1N_HALF: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// `keccak256` of [`EIP712_DOMAIN_TYPE`].
pub fn domain_typehash() -> B256 {
    static HASH: OnceLock<B256> = OnceLock::new();
    *HASH.get_or_init(|| keccak256(EIP712_DOMAIN_TYPE))
}

/// `keccak256` of [`BURN_TYPE`].
pub fn burn_typehash() -> B256 {
    static HASH: OnceLock<B256> = OnceLock::new();
    *HASH.get_or_init(|| keccak256(BURN_TYPE))
}

/// Signing domain of one token deployment.
///
/// The separator is derived once from the name, version, chain id and
/// contract address and never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenDomain {
    name: String,
    version: String,
    chain_id: u64,
    verifying_contract: Address,
    separator: B256,
}

impl TokenDomain {
    /// Builds the domain and derives its separator.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        let name = name.into();
        let version = version.into();

        let mut buf = Vec::with_capacity(5 * 32);
        buf.extend_from_slice(domain_typehash().as_slice());
        buf.extend_from_slice(keccak256(name.as_bytes()).as_slice());
        buf.extend_from_slice(keccak256(version.as_bytes()).as_slice());
        buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
        buf.extend_from_slice(verifying_contract.into_word().as_slice());
        let separator = keccak256(&buf);

        Self {
            name,
            version,
            chain_id,
            verifying_contract,
            separator,
        }
    }

    /// Domain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Domain version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Chain the domain is bound to.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Token address the domain is bound to.
    pub const fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    /// The `DOMAIN_SEPARATOR` value.
    pub const fn separator(&self) -> B256 {
        self.separator
    }

    /// Same domain as an [`Eip712Domain`], for signers built on `alloy`.
    pub fn to_eip712_domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Owned(self.name.clone())),
            Some(Cow::Owned(self.version.clone())),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }

    /// `keccak256(0x1901 ‖ separator ‖ struct_hash)`.
    pub fn signing_hash(&self, struct_hash: B256) -> B256 {
        let mut buf = [0u8; 66];
        buf[0] = 0x19;
        buf[1] = 0x01;
        buf[2..34].copy_from_slice(self.separator.as_slice());
        buf[34..].copy_from_slice(struct_hash.as_slice());
        keccak256(buf)
    }

    /// Digest the holder must sign to authorize `auth`.
    pub fn burn_signing_hash(&self, auth: &BurnAuthorization) -> B256 {
        self.signing_hash(auth.struct_hash())
    }

    /// Recovers the signer of `auth` and checks it is `auth.from`.
    ///
    /// Rejects non-canonical signatures before recovery, so each intent has
    /// exactly one valid signature.
    pub fn verify(
        &self,
        auth: &BurnAuthorization,
        signature: &VrsSignature,
    ) -> TokenResult<Address> {
        let signature = signature.to_canonical()?;
        let digest = self.burn_signing_hash(auth);

        let signer = signature
            .recover_address_from_prehash(&digest)
            .map_err(|err| {
                tracing::debug!(target: "ev_token::eip712", %err, "signer recovery failed");
                TokenError::InvalidSignature
            })?;

        if signer != auth.from {
            tracing::debug!(
                target: "ev_token::eip712",
                ?signer,
                claimed = ?auth.from,
                "recovered signer does not match"
            );
            return Err(TokenError::InvalidSignature);
        }

        Ok(signer)
    }
}

/// Off-chain message authorizing a burn of `amount` from `from`.
///
/// Only ever built transiently while a call is verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnAuthorization {
    /// Holder whose balance is burned.
    pub from: Address,
    /// Amount to burn.
    pub amount: U256,
    /// Holder nonce the authorization consumes.
    pub nonce: U256,
    /// Last block timestamp at which the authorization is valid.
    pub deadline: U256,
}

impl BurnAuthorization {
    /// `keccak256(abi.encode(BURN_TYPEHASH, from, amount, nonce, deadline))`.
    pub fn struct_hash(&self) -> B256 {
        let mut buf = [0u8; 5 * 32];
        buf[..32].copy_from_slice(burn_typehash().as_slice());
        buf[32..64].copy_from_slice(self.from.into_word().as_slice());
        buf[64..96].copy_from_slice(&self.amount.to_be_bytes::<32>());
        buf[96..128].copy_from_slice(&self.nonce.to_be_bytes::<32>());
        buf[128..].copy_from_slice(&self.deadline.to_be_bytes::<32>());
        keccak256(buf)
    }

    /// True once the block timestamp has passed the deadline.
    pub fn is_expired(&self, now: u64) -> bool {
        self.deadline < U256::from(now)
    }
}

impl From<BurnAuthorization> for abi::Burn {
    fn from(auth: BurnAuthorization) -> Self {
        Self {
            from: auth.from,
            amount: auth.amount,
            nonce: auth.nonce,
            deadline: auth.deadline,
        }
    }
}

/// A secp256k1 signature split into the `v`, `r`, `s` call arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrsSignature {
    /// Recovery id, 27 or 28.
    pub v: u8,
    /// `r` scalar.
    pub r: B256,
    /// `s` scalar.
    pub s: B256,
}

impl VrsSignature {
    /// Creates a signature from its call arguments.
    pub const fn new(v: u8, r: B256, s: B256) -> Self {
        Self { v, r, s }
    }

    /// Converts to a recoverable signature, rejecting every non-canonical form:
    /// `v` outside `{27, 28}`, zero scalars, and `s` in the upper half order.
    pub fn to_canonical(&self) -> TokenResult<Signature> {
        let y_parity = match self.v {
            27 => false,
            28 => true,
            _ => return Err(TokenError::InvalidSignature),
        };

        let r = U256::from_be_bytes(self.r.0);
        let s = U256::from_be_bytes(self.s.0);
        if r.is_zero() || s.is_zero() || s > SECP256K1N_HALF {
            return Err(TokenError::InvalidSignature);
        }

        Ok(Signature::new(r, s, y_parity))
    }
}

impl From<Signature> for VrsSignature {
    fn from(signature: Signature) -> Self {
        Self {
            v: 27 + u8::from(signature.v()),
            r: B256::from(signature.r().to_be_bytes::<32>()),
            s: B256::from(signature.s().to_be_bytes::<32>()),
        }
    }
}

/// A burn authorization together with the holder's signature, as handed to a
/// relayer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBurn {
    /// The signed message.
    #[serde(flatten)]
    pub authorization: BurnAuthorization,
    /// Holder signature over the message digest.
    #[serde(flatten)]
    pub signature: VrsSignature,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolStruct;

    const CONTRACT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
    const HOLDER: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn domain() -> TokenDomain {
        TokenDomain::new("TestToken", "1", 31337, CONTRACT)
    }

    fn authorization() -> BurnAuthorization {
        BurnAuthorization {
            from: HOLDER,
            amount: U256::from(50u64),
            nonce: U256::ZERO,
            deadline: U256::from(1_900_000_000u64),
        }
    }

    #[test]
    fn typehash_matches_sol_struct() {
        assert_eq!(abi::Burn::eip712_encode_type(), BURN_TYPE);
        assert_eq!(abi::Burn::eip712_type_hash(&authorization().into()), burn_typehash());
    }

    #[test]
    fn separator_matches_alloy_domain() {
        let domain = domain();
        assert_eq!(domain.separator(), domain.to_eip712_domain().separator());
    }

    #[test]
    fn signing_hash_matches_alloy_eip712() {
        let domain = domain();
        let auth = authorization();
        let expected = abi::Burn::from(auth).eip712_signing_hash(&domain.to_eip712_domain());

        assert_eq!(domain.burn_signing_hash(&auth), expected);
    }

    #[test]
    fn separator_binds_chain_and_contract() {
        let base = domain();
        let other_chain = TokenDomain::new("TestToken", "1", 1, CONTRACT);
        let other_contract = TokenDomain::new("TestToken", "1", 31337, HOLDER);

        assert_ne!(base.separator(), other_chain.separator());
        assert_ne!(base.separator(), other_contract.separator());
    }

    #[test]
    fn struct_hash_covers_every_field() {
        let auth = authorization();
        let bumped = [
            BurnAuthorization { amount: auth.amount + U256::from(1), ..auth },
            BurnAuthorization { nonce: auth.nonce + U256::from(1), ..auth },
            BurnAuthorization { deadline: auth.deadline + U256::from(1), ..auth },
            BurnAuthorization { from: CONTRACT, ..auth },
        ];

        for changed in bumped {
            assert_ne!(changed.struct_hash(), auth.struct_hash());
        }
    }

    #[test]
    fn deadline_is_inclusive() {
        let auth = authorization();
        assert!(!auth.is_expired(1_900_000_000));
        assert!(auth.is_expired(1_900_000_001));
    }

    #[test]
    fn invalid_recovery_id_is_rejected() {
        let sig = VrsSignature::new(29, B256::with_last_byte(1), B256::with_last_byte(1));
        assert_eq!(sig.to_canonical(), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn zero_scalars_are_rejected() {
        let zero_r = VrsSignature::new(27, B256::ZERO, B256::with_last_byte(1));
        let zero_s = VrsSignature::new(27, B256::with_last_byte(1), B256::ZERO);

        assert_eq!(zero_r.to_canonical(), Err(TokenError::InvalidSignature));
        assert_eq!(zero_s.to_canonical(), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn high_s_is_rejected() {
        let high_s = B256::from((SECP256K1N_HALF + U256::from(1)).to_be_bytes::<32>());
        let sig = VrsSignature::new(27, B256::with_last_byte(1), high_s);

        assert_eq!(sig.to_canonical(), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn half_order_s_is_accepted() {
        let half = B256::from(SECP256K1N_HALF.to_be_bytes::<32>());
        let sig = VrsSignature::new(28, B256::with_last_byte(1), half);

        let signature = sig.to_canonical().unwrap();
        assert!(signature.v());
        assert_eq!(signature.s(), SECP256K1N_HALF);
    }

    #[test]
    fn vrs_round_trips_through_signature() {
        let sig = VrsSignature::new(28, B256::with_last_byte(7), B256::with_last_byte(9));
        assert_eq!(VrsSignature::from(sig.to_canonical().unwrap()), sig);
    }
}
