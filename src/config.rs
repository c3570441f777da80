use anyhow::{anyhow, Context, Result};
use ethers::{
    signers::{LocalWallet, Signer},
    types::{Address, U256},
};
use std::env;

use crate::utils::build_wallet;

/// Settings of the `kernel-account` binary, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct KernelConfig {
    pub rpc_url: String,
    pub bundler_url: String,
    pub chain_id: u64,
    pub owner: LocalWallet,
    pub account_index: U256,
    pub entry_point: Option<Address>,
    pub factory_address: Option<Address>,
    pub account_logic_address: Option<Address>,
    pub validator_address: Option<Address>,
    pub deployed_account_address: Option<Address>,
}

impl KernelConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from `lookup`, which returns the value of a variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} not found"));
        let address = |key: &str| -> Result<Option<Address>> {
            lookup(key)
                .map(|value| value.parse::<Address>().with_context(|| format!("invalid {key}")))
                .transpose()
        };

        let chain_id = match lookup("CHAIN_ID") {
            Some(chain_id) => chain_id.parse::<u64>().context("invalid CHAIN_ID")?,
            None => 1,
        };
        let owner = match (lookup("PRIVATE_KEY"), lookup("SEED_PHRASE")) {
            (Some(private_key), _) => private_key
                .parse::<LocalWallet>()
                .context("invalid PRIVATE_KEY")?
                .with_chain_id(chain_id),
            (None, Some(seed)) => build_wallet(&seed, chain_id)?,
            (None, None) => return Err(anyhow!("PRIVATE_KEY or SEED_PHRASE not found")),
        };
        let account_index = match lookup("ACCOUNT_INDEX") {
            Some(index) => U256::from_dec_str(&index).context("invalid ACCOUNT_INDEX")?,
            None => U256::zero(),
        };

        Ok(Self {
            rpc_url: required("RPC_URL")?,
            bundler_url: required("BUNDLER_URL")?,
            chain_id,
            owner,
            account_index,
            entry_point: address("ENTRY_POINT_ADDRESS")?,
            factory_address: address("FACTORY_ADDRESS")?,
            account_logic_address: address("ACCOUNT_LOGIC_ADDRESS")?,
            validator_address: address("VALIDATOR_ADDRESS")?,
            deployed_account_address: address("ACCOUNT_ADDRESS")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn reads_required_and_optional_settings() {
        let config = KernelConfig::from_lookup(lookup(&[
            ("RPC_URL", "http://localhost:8545"),
            ("BUNDLER_URL", "http://localhost:4337"),
            ("PRIVATE_KEY", KEY),
            ("CHAIN_ID", "11155111"),
            ("ACCOUNT_INDEX", "2"),
            ("FACTORY_ADDRESS", "0x1111111111111111111111111111111111111111"),
        ]))
        .unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.owner.chain_id(), 11155111);
        assert_eq!(
            config.owner.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
        assert_eq!(config.account_index, U256::from(2));
        assert_eq!(config.factory_address, Some(Address::repeat_byte(0x11)));
        assert!(config.entry_point.is_none());
    }

    #[test]
    fn seed_phrase_is_accepted() {
        let config = KernelConfig::from_lookup(lookup(&[
            ("RPC_URL", "http://localhost:8545"),
            ("BUNDLER_URL", "http://localhost:4337"),
            ("SEED_PHRASE", "test test test test test test test test test test test junk"),
        ]))
        .unwrap();

        assert_eq!(
            config.owner.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
        assert_eq!(config.chain_id, 1);
    }

    #[test]
    fn missing_key_fails() {
        let err = KernelConfig::from_lookup(lookup(&[
            ("RPC_URL", "http://localhost:8545"),
            ("BUNDLER_URL", "http://localhost:4337"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PRIVATE_KEY or SEED_PHRASE"));
    }

    #[test]
    fn invalid_override_fails() {
        let err = KernelConfig::from_lookup(lookup(&[
            ("RPC_URL", "http://localhost:8545"),
            ("BUNDLER_URL", "http://localhost:4337"),
            ("PRIVATE_KEY", KEY),
            ("ACCOUNT_ADDRESS", "0x12"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid ACCOUNT_ADDRESS");
    }
}
