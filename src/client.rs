//! Bundler JSON-RPC client driving a [`KernelSmartAccount`].

use crate::{
    account::KernelSmartAccount,
    errors::BundlerClientError,
    primitives::{UserOperation, UserOperationGasEstimation, UserOperationHash},
    traits::ChainReader,
    types::{CallRequest, ErrorResponse, GasFees, Request, Response},
};
use ethers::types::{Address, H256};
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

pub struct KernelAccountClient<R: ?Sized> {
    account: KernelSmartAccount<R>,
    bundler_url: String,
    http: reqwest::Client,
}

impl<R: ?Sized + std::fmt::Debug> std::fmt::Debug for KernelAccountClient<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelAccountClient")
            .field("account", &self.account)
            .field("bundler_url", &self.bundler_url)
            .finish()
    }
}

impl<R> KernelAccountClient<R>
where
    R: ChainReader + ?Sized,
{
    pub fn new(account: KernelSmartAccount<R>, bundler_url: impl Into<String>) -> Self {
        Self {
            account,
            bundler_url: bundler_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn account(&self) -> &KernelSmartAccount<R> {
        &self.account
    }

    pub fn bundler_url(&self) -> &str {
        &self.bundler_url
    }

    pub async fn supported_entry_points(&self) -> Result<Vec<Address>, BundlerClientError> {
        let response: Response<Vec<Address>> =
            self.request("eth_supportedEntryPoints", json!([])).await?;
        Ok(response.result)
    }

    pub async fn estimate_user_operation_gas(
        &self,
        user_operation: &UserOperation,
    ) -> Result<UserOperationGasEstimation, BundlerClientError> {
        let params = json!([user_operation, self.account.entry_point()]);
        let response: Response<UserOperationGasEstimation> =
            self.request("eth_estimateUserOperationGas", params).await?;
        Ok(response.result)
    }

    pub async fn send_user_operation(
        &self,
        user_operation: &UserOperation,
    ) -> Result<UserOperationHash, BundlerClientError> {
        let params = json!([user_operation, self.account.entry_point()]);
        let response: Response<H256> = self.request("eth_sendUserOperation", params).await?;
        Ok(response.result.into())
    }

    /// Fills in and signs a user operation executing `request`.
    ///
    /// Gas limits come from the bundler's estimate of the operation carrying the validator's
    /// dummy signature; `fees` are applied as given.
    pub async fn prepare_user_operation(
        &self,
        request: &CallRequest,
        fees: GasFees,
    ) -> Result<UserOperation, BundlerClientError> {
        let (nonce, init_code, call_data) = tokio::try_join!(
            self.account.get_nonce(),
            self.account.get_init_code(),
            self.account.encode_call_data(request),
        )?;

        let mut user_operation = UserOperation::default()
            .sender(self.account.address())
            .nonce(nonce)
            .init_code(init_code)
            .call_data(call_data)
            .max_fee_per_gas(fees.max_fee_per_gas)
            .max_priority_fee_per_gas(fees.max_priority_fee_per_gas);
        user_operation.signature = self.account.get_dummy_signature(&user_operation).await?;

        let estimation = self.estimate_user_operation_gas(&user_operation).await?;
        user_operation = user_operation
            .call_gas_limit(estimation.call_gas_limit)
            .verification_gas_limit(estimation.verification_gas_limit)
            .pre_verification_gas(estimation.pre_verification_gas);

        user_operation.signature = self.account.sign_user_operation(&user_operation).await?;
        Ok(user_operation)
    }

    pub async fn send_transactions(
        &self,
        request: &CallRequest,
        fees: GasFees,
    ) -> Result<UserOperationHash, BundlerClientError> {
        let user_operation = self.prepare_user_operation(request, fees).await?;
        let hash = self.send_user_operation(&user_operation).await?;
        log::info!(
            "user operation {:?} sent from {:?}",
            hash.0,
            user_operation.sender
        );
        Ok(hash)
    }

    async fn request<P, T>(&self, method: &str, params: P) -> Result<Response<T>, BundlerClientError>
    where
        P: Serialize,
        T: DeserializeOwned + std::fmt::Debug,
    {
        log::debug!("{} -> {}", method, self.bundler_url);
        let body = self
            .http
            .post(&self.bundler_url)
            .json(&Request::new(method, params))
            .send()
            .await?
            .text()
            .await?;
        parse_response(&body)
    }
}

/// Decodes a bundler JSON-RPC reply, mapping known gas errors onto typed variants.
pub fn parse_response<T>(body: &str) -> Result<Response<T>, BundlerClientError>
where
    T: DeserializeOwned + std::fmt::Debug,
{
    let value: Value = serde_json::from_str(body)?;

    if value.get("error").is_some() {
        let error_response: ErrorResponse = serde_json::from_value(value)?;
        log::warn!("Error: {:?}", error_response);
        return Err(classify_error(
            error_response.error.code,
            error_response.error.message,
        )?);
    }

    if value.get("result").map_or(true, Value::is_null) {
        return Err(BundlerClientError::EmptyResponse);
    }

    let response: Response<T> = serde_json::from_value(value)?;
    log::info!("Success {:?}", response.result);
    Ok(response)
}

fn classify_error(code: i64, message: String) -> Result<BundlerClientError, BundlerClientError> {
    if let Some((limit, estimation)) = captured_pair(
        r"Call gas limit (\d+) is lower than call gas estimation (\d+)",
        &message,
    )? {
        return Ok(BundlerClientError::CallGasLimitError(estimation, limit));
    }

    if let Some((provided, calculated)) = captured_pair(
        r"Pre-verification gas (\d+) is lower than calculated pre-verification gas (\d+)",
        &message,
    )? {
        return Ok(BundlerClientError::PreVerificationGasError(calculated, provided));
    }

    if message.contains("AA40 over verificationGasLimit") {
        return Ok(BundlerClientError::VerificationGasLimitError);
    }

    Ok(BundlerClientError::Rpc { code, message })
}

fn captured_pair(pattern: &str, message: &str) -> Result<Option<(u64, u64)>, BundlerClientError> {
    let Some(captures) = Regex::new(pattern)?.captures(message) else {
        return Ok(None);
    };
    match (captures[1].parse(), captures[2].parse()) {
        (Ok(first), Ok(second)) => Ok(Some((first, second))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    fn error_body(message: &str) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32500, "message": message }
        })
        .to_string()
    }

    #[test]
    fn parses_successful_estimate() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "preVerificationGas": "0xb4b8",
                "verificationGasLimit": "0x186a0",
                "callGasLimit": "0x5208"
            }
        })
        .to_string();

        let response: Response<UserOperationGasEstimation> = parse_response(&body).unwrap();
        assert_eq!(response.result.pre_verification_gas, U256::from(0xb4b8));
        assert_eq!(response.result.verification_gas_limit, U256::from(100_000));
        assert_eq!(response.result.call_gas_limit, U256::from(21_000));
    }

    #[test]
    fn parses_entry_point_list() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": [crate::consts::ENTRY_POINT_V06]
        })
        .to_string();

        let response: Response<Vec<Address>> = parse_response(&body).unwrap();
        assert_eq!(
            response.result,
            vec![crate::consts::ENTRY_POINT_V06.parse::<Address>().unwrap()]
        );
    }

    #[test]
    fn maps_call_gas_limit_error() {
        let body = error_body("Call gas limit 21000 is lower than call gas estimation 35000");
        let err = parse_response::<H256>(&body).unwrap_err();
        assert!(matches!(err, BundlerClientError::CallGasLimitError(35000, 21000)));
        assert_eq!(
            err.to_string(),
            "Call gas limit not enough: calculated: 35000, provided: 21000"
        );
    }

    #[test]
    fn maps_pre_verification_gas_error() {
        let body = error_body(
            "Pre-verification gas 40000 is lower than calculated pre-verification gas 46228",
        );
        let err = parse_response::<H256>(&body).unwrap_err();
        assert!(matches!(err, BundlerClientError::PreVerificationGasError(46228, 40000)));
    }

    #[test]
    fn maps_verification_gas_limit_error() {
        let body = error_body("UserOperation reverted during simulation with reason: AA40 over verificationGasLimit");
        let err = parse_response::<H256>(&body).unwrap_err();
        assert!(matches!(err, BundlerClientError::VerificationGasLimitError));
    }

    #[test]
    fn keeps_unknown_rpc_errors() {
        let body = error_body("AA21 didn't pay prefund");
        let err = parse_response::<H256>(&body).unwrap_err();
        assert!(matches!(
            err,
            BundlerClientError::Rpc { code: -32500, ref message } if message == "AA21 didn't pay prefund"
        ));
    }

    #[test]
    fn null_result_is_empty() {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "result": null }).to_string();
        let err = parse_response::<H256>(&body).unwrap_err();
        assert!(matches!(err, BundlerClientError::EmptyResponse));
    }

    #[test]
    fn malformed_body_is_json_error() {
        let err = parse_response::<H256>("not json").unwrap_err();
        assert!(matches!(err, BundlerClientError::Json(_)));
    }

    #[test]
    fn request_envelope() {
        let request = Request::new("eth_supportedEntryPoints", json!([]));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "eth_supportedEntryPoints",
                "params": []
            })
        );
    }
}
