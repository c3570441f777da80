//! EIP-1271 signing for the kernel account.
//!
//! Every message is first reduced to a 32 byte hash, then wrapped in the account's own EIP-712
//! domain so the account contract can check it in `isValidSignature`:
//!
//! `keccak256(0x1901 ++ domainSeparator ++ messageHash)`

use crate::{
    consts::EIP712_DOMAIN_TYPE,
    errors::{KernelAccountError, TypedDataError},
    gen::kernel::eip712DomainCall,
    traits::{ChainReader, KernelValidator},
    utils::{from_alloy_address, from_alloy_u256},
};
use alloy::sol_types::SolCall;
use ethers::{
    abi::{encode, Token},
    types::{
        transaction::eip712::{Eip712, TypedData},
        Address, Bytes, H256, U256,
    },
    utils::keccak256,
};
use std::collections::HashSet;

/// Account whose domain wraps the signed hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRef {
    pub address: Address,
    /// Where `eip712Domain()` is read from
    pub logic_address: Address,
}

/// Message accepted by `sign_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignableMessage {
    Text(String),
    Raw(Bytes),
}

impl From<&str> for SignableMessage {
    fn from(value: &str) -> Self {
        SignableMessage::Text(value.to_string())
    }
}

impl From<String> for SignableMessage {
    fn from(value: String) -> Self {
        SignableMessage::Text(value)
    }
}

impl From<Bytes> for SignableMessage {
    fn from(value: Bytes) -> Self {
        SignableMessage::Raw(value)
    }
}

impl From<Vec<u8>> for SignableMessage {
    fn from(value: Vec<u8>) -> Self {
        SignableMessage::Raw(value.into())
    }
}

/// Decoded `eip712Domain()` of the account contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDomain {
    pub fields: u8,
    pub name: String,
    pub version: String,
    pub chain_id: U256,
    pub verifying_contract: Address,
    pub salt: H256,
    pub extensions: Vec<U256>,
}

impl AccountDomain {
    /// Separator over name, version and chain id, bound to `account`.
    ///
    /// `verifying_contract`, `salt`, `extensions` and the `fields` bitmap are not part of it,
    /// whatever the contract reports.
    pub fn separator(&self, account: Address) -> H256 {
        H256(keccak256(encode(&[
            Token::FixedBytes(keccak256(EIP712_DOMAIN_TYPE).to_vec()),
            Token::FixedBytes(keccak256(self.name.as_bytes()).to_vec()),
            Token::FixedBytes(keccak256(self.version.as_bytes()).to_vec()),
            Token::Uint(self.chain_id),
            Token::Address(account),
        ])))
    }
}

pub async fn read_account_domain<R>(
    reader: &R,
    logic_address: Address,
) -> Result<AccountDomain, KernelAccountError>
where
    R: ChainReader + ?Sized,
{
    let data = reader
        .call(logic_address, eip712DomainCall {}.abi_encode().into())
        .await?;
    let domain = eip712DomainCall::abi_decode_returns(&data, true)?;

    Ok(AccountDomain {
        fields: domain.fields.0[0],
        name: domain.name,
        version: domain.version,
        chain_id: from_alloy_u256(domain.chainId),
        verifying_contract: from_alloy_address(domain.verifyingContract),
        salt: H256(domain.salt.0),
        extensions: domain.extensions.into_iter().map(from_alloy_u256).collect(),
    })
}

pub fn eip1271_digest(domain_separator: H256, message_hash: H256) -> H256 {
    H256(keccak256(
        [&[0x19u8, 0x01][..], domain_separator.as_bytes(), message_hash.as_bytes()].concat(),
    ))
}

/// Wraps `message_hash` in the account domain and has the validator's signer sign the result.
pub async fn sign_hash<R>(
    reader: &R,
    validator: &dyn KernelValidator,
    account: AccountRef,
    message_hash: H256,
) -> Result<Bytes, KernelAccountError>
where
    R: ChainReader + ?Sized,
{
    let domain = read_account_domain(reader, account.logic_address).await?;
    let digest = eip1271_digest(domain.separator(account.address), message_hash);
    validator.sign_message(digest.as_bytes()).await
}

pub fn hash_message(message: &SignableMessage) -> H256 {
    match message {
        SignableMessage::Text(text) => H256(keccak256(text.as_bytes())),
        SignableMessage::Raw(raw) => H256(keccak256(raw)),
    }
}

/// Checks that the types, domain and message of `typed_data` describe a hashable structure.
pub fn validate_typed_data(typed_data: &TypedData) -> Result<(), TypedDataError> {
    let domain = &typed_data.domain;
    if domain.name.is_none()
        && domain.version.is_none()
        && domain.chain_id.is_none()
        && domain.verifying_contract.is_none()
        && domain.salt.is_none()
    {
        return Err(TypedDataError::EmptyDomain);
    }

    for (owner, fields) in typed_data.types.iter() {
        let mut seen = HashSet::new();
        for field in fields {
            if !seen.insert(field.name.as_str()) {
                return Err(TypedDataError::DuplicateField {
                    owner: owner.clone(),
                    field: field.name.clone(),
                });
            }

            let base = strip_array_suffixes(&field.r#type).ok_or_else(|| {
                TypedDataError::MalformedFieldType {
                    owner: owner.clone(),
                    field: field.name.clone(),
                    ty: field.r#type.clone(),
                }
            })?;
            if !is_atomic_type(base) && !typed_data.types.contains_key(base) {
                return Err(TypedDataError::UnknownFieldType {
                    owner: owner.clone(),
                    field: field.name.clone(),
                    ty: field.r#type.clone(),
                });
            }
        }
    }

    let primary = typed_data
        .types
        .get(&typed_data.primary_type)
        .ok_or_else(|| TypedDataError::UnknownPrimaryType(typed_data.primary_type.clone()))?;

    for field in primary {
        if !typed_data.message.contains_key(&field.name) {
            return Err(TypedDataError::MissingMessageField(field.name.clone()));
        }
    }
    for key in typed_data.message.keys() {
        if !primary.iter().any(|field| &field.name == key) {
            return Err(TypedDataError::UndeclaredMessageField(key.clone()));
        }
    }

    Ok(())
}

/// EIP-712 hash of `typed_data` under its own domain, after validation.
pub fn hash_typed_data(typed_data: &TypedData) -> Result<H256, TypedDataError> {
    validate_typed_data(typed_data)?;
    typed_data
        .encode_eip712()
        .map(H256)
        .map_err(|e| TypedDataError::Encoding(e.to_string()))
}

/// `Person[2][]` -> `Person`; `None` when a suffix is malformed.
fn strip_array_suffixes(ty: &str) -> Option<&str> {
    let mut base = ty;
    while let Some(stripped) = base.strip_suffix(']') {
        let open = stripped.rfind('[')?;
        let size = &stripped[open + 1..];
        if !size.is_empty() && (size.parse::<usize>().ok()? == 0) {
            return None;
        }
        base = &stripped[..open];
    }
    if base.is_empty() || base.contains('[') || base.contains(']') {
        return None;
    }
    Some(base)
}

fn is_atomic_type(ty: &str) -> bool {
    match ty {
        "address" | "bool" | "string" | "bytes" => true,
        _ => {
            if let Some(size) = ty.strip_prefix("bytes") {
                return matches!(size.parse::<usize>(), Ok(1..=32));
            }
            let bits = ty.strip_prefix("uint").or_else(|| ty.strip_prefix("int"));
            match bits.map(str::parse::<usize>) {
                Some(Ok(bits)) => bits % 8 == 0 && (8..=256).contains(&bits),
                _ => false,
            }
        }
    }
}
