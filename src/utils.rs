use crate::errors::ConfigurationError;
use alloy::primitives::{Address as a_Address, Bytes as a_Bytes, U256 as a_U256};
use ethers::{
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer},
    types::{Address, Bytes, U256},
};

pub fn to_alloy_address(address: Address) -> a_Address {
    a_Address::from(address.0)
}

pub fn to_alloy_u256(value: U256) -> a_U256 {
    a_U256::from_limbs(value.0)
}

pub fn to_alloy_bytes(bytes: &Bytes) -> a_Bytes {
    bytes.to_vec().into()
}

pub fn from_alloy_address(address: a_Address) -> Address {
    Address::from_slice(address.as_slice())
}

pub fn from_alloy_u256(value: a_U256) -> U256 {
    U256(value.into_limbs())
}

/// `address`, or the well-known `default` when unset.
pub fn address_or(
    address: Option<Address>,
    default: &str,
) -> Result<Address, ConfigurationError> {
    match address {
        Some(address) => Ok(address),
        None => default
            .parse()
            .map_err(|_| ConfigurationError::InvalidAddress(default.to_string())),
    }
}

pub fn build_wallet(seed: &str, chain_id: u64) -> anyhow::Result<LocalWallet> {
    let wallet = MnemonicBuilder::<English>::default().phrase(seed).build()?;
    Ok(wallet.with_chain_id(chain_id))
}
