//! The kernel smart account handle.
//!
//! [`create_kernel_account`] resolves the account address once and hands back a
//! [`KernelSmartAccount`], which encodes calls and signs on behalf of the account through its
//! active validator.

pub mod address;
pub mod call_data;
pub mod init_code;
pub mod signer;

pub use address::resolve_address;
pub use call_data::{encode_call_data, encode_deploy_call_data, encode_deploy_data};
pub use init_code::InitCodeBuilder;
pub use signer::{
    eip1271_digest, hash_message, hash_typed_data, read_account_domain, sign_hash,
    validate_typed_data, AccountDomain, AccountRef, SignableMessage,
};

use crate::{
    consts::{
        CREATE_CALL, ENTRY_POINT_V06, KERNEL_ACCOUNT_LOGIC, KERNEL_ACCOUNT_SOURCE, KERNEL_FACTORY,
    },
    errors::{ConfigurationError, KernelAccountError},
    primitives::UserOperation,
    traits::{ChainReader, KernelValidator},
    types::{CallRequest, DeployCall},
    utils::address_or,
};
use ethers::types::{
    transaction::{eip2718::TypedTransaction, eip712::TypedData},
    Address, Bytes, U256,
};
use std::sync::Arc;

/// Construction parameters of a kernel account. Unset addresses fall back to the well-known
/// deployments.
#[derive(Debug, Clone, Default)]
pub struct KernelAccountOptions {
    pub default_validator: Option<Arc<dyn KernelValidator>>,
    pub plugin: Option<Arc<dyn KernelValidator>>,
    pub plugin_enable_signature: Option<Bytes>,
    pub index: U256,
    pub entry_point: Option<Address>,
    pub factory_address: Option<Address>,
    pub account_logic_address: Option<Address>,
    pub create_call_address: Option<Address>,
    pub init_code: Option<Bytes>,
    pub deployed_account_address: Option<Address>,
}

impl KernelAccountOptions {
    pub fn new(default_validator: Arc<dyn KernelValidator>) -> Self {
        Self {
            default_validator: Some(default_validator),
            ..Default::default()
        }
    }

    pub fn plugin(mut self, plugin: Arc<dyn KernelValidator>) -> Self {
        self.plugin = Some(plugin);
        self
    }

    pub fn index(mut self, index: U256) -> Self {
        self.index = index;
        self
    }

    pub fn deployed_account_address(mut self, address: Address) -> Self {
        self.deployed_account_address = Some(address);
        self
    }
}

#[derive(Debug)]
pub struct KernelSmartAccount<R: ?Sized> {
    reader: Arc<R>,
    address: Address,
    entry_point: Address,
    account_logic_address: Address,
    create_call_address: Address,
    init_code: InitCodeBuilder,
    default_validator: Option<Arc<dyn KernelValidator>>,
    plugin: Option<Arc<dyn KernelValidator>>,
    /// Plugin if present, otherwise the default validator
    validator: Arc<dyn KernelValidator>,
    plugin_enable_signature: Option<Bytes>,
}

/// Builds the account handle, deriving its address from the init code unless
/// `deployed_account_address` is given.
pub async fn create_kernel_account<R>(
    reader: Arc<R>,
    options: KernelAccountOptions,
) -> Result<KernelSmartAccount<R>, KernelAccountError>
where
    R: ChainReader + ?Sized,
{
    let validator = options
        .plugin
        .clone()
        .or_else(|| options.default_validator.clone())
        .ok_or(ConfigurationError::NoValidator)?;

    let entry_point = address_or(options.entry_point, ENTRY_POINT_V06)?;
    let account_logic_address = address_or(options.account_logic_address, KERNEL_ACCOUNT_LOGIC)?;
    let init_code = InitCodeBuilder::new(
        address_or(options.factory_address, KERNEL_FACTORY)?,
        account_logic_address,
        options.index,
        options.init_code,
        options.default_validator.clone(),
    );

    let address = resolve_address(
        reader.as_ref(),
        entry_point,
        options.deployed_account_address,
        || init_code.generate(),
    )
    .await?;
    log::info!(
        "kernel account {:?} ready, validator {:?}",
        address,
        validator.address()
    );

    Ok(KernelSmartAccount {
        reader,
        address,
        entry_point,
        account_logic_address,
        create_call_address: address_or(options.create_call_address, CREATE_CALL)?,
        init_code,
        default_validator: options.default_validator,
        plugin: options.plugin,
        validator,
        plugin_enable_signature: options.plugin_enable_signature,
    })
}

impl<R> KernelSmartAccount<R>
where
    R: ChainReader + ?Sized,
{
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn entry_point(&self) -> Address {
        self.entry_point
    }

    pub fn source(&self) -> &'static str {
        KERNEL_ACCOUNT_SOURCE
    }

    pub fn default_validator(&self) -> Option<&Arc<dyn KernelValidator>> {
        self.default_validator.as_ref()
    }

    pub fn plugin(&self) -> Option<&Arc<dyn KernelValidator>> {
        self.plugin.as_ref()
    }

    /// The validator user operations and messages are signed with.
    pub fn validator(&self) -> &Arc<dyn KernelValidator> {
        &self.validator
    }

    fn account_ref(&self) -> AccountRef {
        AccountRef {
            address: self.address,
            logic_address: self.account_logic_address,
        }
    }

    pub async fn get_nonce(&self) -> Result<U256, KernelAccountError> {
        self.reader.get_nonce(self.address, self.entry_point).await
    }

    pub async fn generate_init_code(&self) -> Result<Bytes, KernelAccountError> {
        self.init_code.generate().await
    }

    /// Init code for the next user operation: empty once the account is deployed.
    pub async fn get_init_code(&self) -> Result<Bytes, KernelAccountError> {
        let code = self.reader.get_code(self.address).await?;
        if !code.is_empty() {
            return Ok(Bytes::default());
        }
        self.generate_init_code().await
    }

    pub async fn get_plugin_enable_signature(&self) -> Result<Option<Bytes>, KernelAccountError> {
        if let Some(signature) = &self.plugin_enable_signature {
            return Ok(Some(signature.clone()));
        }

        match (&self.plugin, &self.default_validator) {
            (Some(plugin), Some(default_validator)) => {
                log::debug!(
                    "requesting enable signature for plugin {:?} on {:?}",
                    plugin.address(),
                    self.address
                );
                let signature = default_validator
                    .get_plugin_enable_signature(self.address, plugin.as_ref())
                    .await?;
                Ok(Some(signature))
            }
            _ => Ok(None),
        }
    }

    pub async fn sign_user_operation(
        &self,
        user_operation: &UserOperation,
    ) -> Result<Bytes, KernelAccountError> {
        let enable_signature = self.get_plugin_enable_signature().await?;
        self.validator
            .sign_user_operation(user_operation, enable_signature.as_ref())
            .await
    }

    pub async fn get_dummy_signature(
        &self,
        user_operation: &UserOperation,
    ) -> Result<Bytes, KernelAccountError> {
        let enable_signature = self.get_plugin_enable_signature().await?;
        self.validator
            .get_dummy_signature(user_operation, enable_signature.as_ref())
            .await
    }

    pub async fn encode_call_data(
        &self,
        request: &CallRequest,
    ) -> Result<Bytes, KernelAccountError> {
        encode_call_data(self.address, self.validator.as_ref(), request).await
    }

    pub fn encode_deploy_call_data(&self, deploy: &DeployCall) -> Result<Bytes, KernelAccountError> {
        encode_deploy_call_data(self.create_call_address, deploy)
    }

    pub async fn sign_message(
        &self,
        message: impl Into<SignableMessage>,
    ) -> Result<Bytes, KernelAccountError> {
        let message_hash = hash_message(&message.into());
        sign_hash(
            self.reader.as_ref(),
            self.validator.as_ref(),
            self.account_ref(),
            message_hash,
        )
        .await
    }

    pub async fn sign_typed_data(
        &self,
        typed_data: &TypedData,
    ) -> Result<Bytes, KernelAccountError> {
        let message_hash = hash_typed_data(typed_data)?;
        sign_hash(
            self.reader.as_ref(),
            self.validator.as_ref(),
            self.account_ref(),
            message_hash,
        )
        .await
    }

    pub async fn sign_transaction(
        &self,
        _transaction: &TypedTransaction,
    ) -> Result<Bytes, KernelAccountError> {
        Err(KernelAccountError::SignTransactionNotSupported)
    }
}
