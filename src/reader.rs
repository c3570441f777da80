use crate::{
    errors::KernelAccountError,
    gen::{
        entry_point::{getSenderAddressCall, SenderAddressResult},
        EntryPoint,
    },
    traits::ChainReader,
    utils::{from_alloy_address, to_alloy_bytes},
};
use alloy::sol_types::{SolCall, SolError};
use async_trait::async_trait;
use ethers::{
    providers::{Middleware, MiddlewareError},
    types::{transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest, U256},
};
use std::sync::Arc;

/// [`ChainReader`] over an ethers middleware stack.
#[derive(Debug, Clone)]
pub struct ProviderReader<M> {
    inner: Arc<M>,
}

impl<M: Middleware + 'static> ProviderReader<M> {
    pub fn new(inner: Arc<M>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<M: Middleware + 'static> ChainReader for ProviderReader<M> {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, KernelAccountError> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        self.inner
            .call(&tx, None)
            .await
            .map_err(|e| KernelAccountError::Provider(e.to_string()))
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, KernelAccountError> {
        self.inner
            .get_code(address, None)
            .await
            .map_err(|e| KernelAccountError::Provider(e.to_string()))
    }

    async fn get_nonce(
        &self,
        sender: Address,
        entry_point: Address,
    ) -> Result<U256, KernelAccountError> {
        EntryPoint::new(entry_point, self.inner.clone())
            .get_nonce(sender, U256::zero())
            .call()
            .await
            .map_err(|e| KernelAccountError::Provider(e.to_string()))
    }

    async fn get_sender_address(
        &self,
        init_code: Bytes,
        entry_point: Address,
    ) -> Result<Option<Address>, KernelAccountError> {
        let data = getSenderAddressCall {
            initCode: to_alloy_bytes(&init_code),
        }
        .abi_encode();
        let tx: TypedTransaction = TransactionRequest::new()
            .to(entry_point)
            .data(Bytes::from(data))
            .into();

        let revert_data = match self.inner.call(&tx, None).await {
            Ok(_) => return Ok(None),
            Err(e) => match e.as_error_response().and_then(|r| r.as_revert_data()) {
                Some(data) => data,
                None => return Err(KernelAccountError::Provider(e.to_string())),
            },
        };

        Ok(SenderAddressResult::abi_decode(&revert_data, true)
            .ok()
            .map(|result| from_alloy_address(result.sender))
            .filter(|address| !address.is_zero()))
    }
}
