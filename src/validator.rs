//! ECDSA validator: the kernel account's default sudo validator, owned by a single EOA.

use crate::{
    consts::{
        DUMMY_ECDSA_SIGNATURE, EIP712_DOMAIN_TYPE, ENABLE_MODE, KERNEL_NAME, KERNEL_VERSION,
        SUDO_MODE, VALIDATOR_APPROVED_TYPE,
    },
    errors::KernelAccountError,
    gen::kernel::executeCall,
    primitives::UserOperation,
    traits::KernelValidator,
};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use ethers::{
    abi::{encode, Token},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, U256},
    utils::keccak256,
};

#[derive(Debug, Clone)]
pub struct EcdsaValidator {
    owner: LocalWallet,
    validator_address: Address,
    entry_point: Address,
    chain_id: u64,
    /// Executor recorded in enable-mode signatures; zero allows any executor
    executor: Address,
}

impl EcdsaValidator {
    pub fn new(
        owner: LocalWallet,
        validator_address: Address,
        entry_point: Address,
        chain_id: u64,
    ) -> Self {
        Self {
            owner,
            validator_address,
            entry_point,
            chain_id,
            executor: Address::zero(),
        }
    }

    pub fn with_executor(mut self, executor: Address) -> Self {
        self.executor = executor;
        self
    }

    /// Digest the kernel account checks before installing a plugin in enable mode.
    ///
    /// `executor` must be the one the plugin writes into its enable-mode signatures.
    pub fn plugin_approval_digest(
        &self,
        account_address: Address,
        plugin_address: Address,
        executor: Address,
        enable_data: &Bytes,
    ) -> [u8; 32] {
        // validUntil and validAfter are zero, leaving only the validator in the low 160 bits
        let validator_data = U256::from_big_endian(plugin_address.as_bytes());
        let struct_hash = keccak256(encode(&[
            Token::FixedBytes(keccak256(VALIDATOR_APPROVED_TYPE).to_vec()),
            Token::FixedBytes(executeCall::SELECTOR.to_vec()),
            Token::Uint(validator_data),
            Token::Address(executor),
            Token::FixedBytes(keccak256(enable_data).to_vec()),
        ]));
        let domain_separator = keccak256(encode(&[
            Token::FixedBytes(keccak256(EIP712_DOMAIN_TYPE).to_vec()),
            Token::FixedBytes(keccak256(KERNEL_NAME).to_vec()),
            Token::FixedBytes(keccak256(KERNEL_VERSION).to_vec()),
            Token::Uint(U256::from(self.chain_id)),
            Token::Address(account_address),
        ]));

        keccak256([&[0x19u8, 0x01][..], &domain_separator[..], &struct_hash[..]].concat())
    }

    async fn wrap_signature(
        &self,
        signature: &[u8],
        enable_signature: Option<&Bytes>,
    ) -> Result<Bytes, KernelAccountError> {
        let Some(enable_signature) = enable_signature else {
            return Ok([&SUDO_MODE[..], signature].concat().into());
        };

        let enable_data = self.get_enable_data().await?;
        let mut packed = Vec::with_capacity(
            4 + 12 + 40 + 64 + enable_data.len() + enable_signature.len() + signature.len(),
        );
        packed.extend_from_slice(&ENABLE_MODE);
        // validAfter, validUntil
        packed.extend_from_slice(&[0u8; 12]);
        packed.extend_from_slice(self.validator_address.as_bytes());
        packed.extend_from_slice(self.executor.as_bytes());
        packed.extend_from_slice(&length_word(enable_data.len()));
        packed.extend_from_slice(&enable_data);
        packed.extend_from_slice(&length_word(enable_signature.len()));
        packed.extend_from_slice(enable_signature);
        packed.extend_from_slice(signature);
        Ok(packed.into())
    }
}

fn length_word(len: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    U256::from(len).to_big_endian(&mut word);
    word
}

#[async_trait]
impl KernelValidator for EcdsaValidator {
    fn address(&self) -> Address {
        self.validator_address
    }

    fn signer_address(&self) -> Address {
        self.owner.address()
    }

    fn executor(&self) -> Address {
        self.executor
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, KernelAccountError> {
        let signature = self
            .owner
            .sign_message(message)
            .await
            .map_err(|e| KernelAccountError::Signer(e.to_string()))?;
        Ok(signature.to_vec().into())
    }

    async fn get_enable_data(&self) -> Result<Bytes, KernelAccountError> {
        Ok(self.owner.address().as_bytes().to_vec().into())
    }

    async fn sign_user_operation(
        &self,
        user_operation: &UserOperation,
        enable_signature: Option<&Bytes>,
    ) -> Result<Bytes, KernelAccountError> {
        let hash = user_operation.hash(&self.entry_point, &U256::from(self.chain_id));
        let signature = self.sign_message(hash.as_fixed_bytes()).await?;
        self.wrap_signature(&signature, enable_signature).await
    }

    async fn get_dummy_signature(
        &self,
        _user_operation: &UserOperation,
        enable_signature: Option<&Bytes>,
    ) -> Result<Bytes, KernelAccountError> {
        let dummy: Bytes = DUMMY_ECDSA_SIGNATURE
            .parse()
            .map_err(|_| KernelAccountError::Signer("malformed dummy signature".to_string()))?;
        self.wrap_signature(&dummy, enable_signature).await
    }

    async fn get_plugin_enable_signature(
        &self,
        account_address: Address,
        plugin: &dyn KernelValidator,
    ) -> Result<Bytes, KernelAccountError> {
        let enable_data = plugin.get_enable_data().await?;
        let digest = self.plugin_approval_digest(
            account_address,
            plugin.address(),
            plugin.executor(),
            &enable_data,
        );
        self.sign_message(&digest).await
    }
}
