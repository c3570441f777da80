use crate::{
    errors::{ConfigurationError, KernelAccountError},
    gen::kernel::{createAccountCall, initializeCall},
    traits::KernelValidator,
    utils::{to_alloy_address, to_alloy_bytes, to_alloy_u256},
};
use alloy::sol_types::SolCall;
use ethers::types::{Address, Bytes, U256};
use std::sync::Arc;

/// Inputs of the kernel factory call that deploys the account on first use.
///
/// All fields are fixed at construction, so [`InitCodeBuilder::generate`] always yields the same
/// bytes and can be re-run instead of cached.
#[derive(Debug, Clone)]
pub struct InitCodeBuilder {
    pub(crate) factory_address: Address,
    pub(crate) account_logic_address: Address,
    pub(crate) index: U256,
    pub(crate) init_code: Option<Bytes>,
    pub(crate) default_validator: Option<Arc<dyn KernelValidator>>,
}

impl InitCodeBuilder {
    pub fn new(
        factory_address: Address,
        account_logic_address: Address,
        index: U256,
        init_code: Option<Bytes>,
        default_validator: Option<Arc<dyn KernelValidator>>,
    ) -> Self {
        Self {
            factory_address,
            account_logic_address,
            index,
            init_code,
            default_validator,
        }
    }

    /// `factory ++ createAccount(logic, initialize(validator, enableData), index)`
    pub async fn generate(&self) -> Result<Bytes, KernelAccountError> {
        if let Some(init_code) = &self.init_code {
            return Ok(init_code.clone());
        }

        let validator = self
            .default_validator
            .as_ref()
            .ok_or(ConfigurationError::NoInitCode)?;
        let enable_data = validator.get_enable_data().await?;

        let initialize = initializeCall {
            _defaultValidator: to_alloy_address(validator.address()),
            _data: to_alloy_bytes(&enable_data),
        }
        .abi_encode();
        let create_account = createAccountCall {
            _implementation: to_alloy_address(self.account_logic_address),
            _data: initialize.into(),
            _index: to_alloy_u256(self.index),
        }
        .abi_encode();

        Ok([self.factory_address.as_bytes(), &create_account[..]]
            .concat()
            .into())
    }
}
