use crate::{errors::KernelAccountError, primitives::UserOperation};
use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};
use std::fmt::Debug;

/// Read access to the chain the account lives on.
#[async_trait]
pub trait ChainReader: Debug + Send + Sync {
    /// Executes a view call against `to` and returns the raw return data.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, KernelAccountError>;

    /// Bytecode deployed at `address`, empty if none.
    async fn get_code(&self, address: Address) -> Result<Bytes, KernelAccountError>;

    /// Entry point nonce of `sender` for the default key.
    async fn get_nonce(&self, sender: Address, entry_point: Address)
        -> Result<U256, KernelAccountError>;

    /// Counterfactual account address the entry point derives from `init_code`.
    ///
    /// Returns `None` when the simulation yields no address.
    async fn get_sender_address(
        &self,
        init_code: Bytes,
        entry_point: Address,
    ) -> Result<Option<Address>, KernelAccountError>;
}

/// A validator or plugin installed on the kernel account.
///
/// The account never signs on its own: user operations, messages and plugin approvals are all
/// routed through one of these.
#[async_trait]
pub trait KernelValidator: Debug + Send + Sync {
    /// Address of the validator contract
    fn address(&self) -> Address;

    /// Address of the key backing the validator
    fn signer_address(&self) -> Address;

    /// Executor written into enable-mode signatures; zero allows any executor.
    fn executor(&self) -> Address {
        Address::zero()
    }

    /// Signs an arbitrary message with the underlying signer.
    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, KernelAccountError>;

    /// Data passed to the validator's `enable` when it is installed.
    async fn get_enable_data(&self) -> Result<Bytes, KernelAccountError>;

    async fn sign_user_operation(
        &self,
        user_operation: &UserOperation,
        enable_signature: Option<&Bytes>,
    ) -> Result<Bytes, KernelAccountError>;

    /// Signature with the shape of a real one, used for gas estimation.
    async fn get_dummy_signature(
        &self,
        user_operation: &UserOperation,
        enable_signature: Option<&Bytes>,
    ) -> Result<Bytes, KernelAccountError>;

    /// Whether calls targeting the account itself reach this validator through the fallback
    /// handler instead of `execute`.
    async fn should_delegate_via_fallback(&self) -> bool {
        false
    }

    /// Approval for `plugin` to act on behalf of `account_address`.
    async fn get_plugin_enable_signature(
        &self,
        account_address: Address,
        plugin: &dyn KernelValidator,
    ) -> Result<Bytes, KernelAccountError>;
}
