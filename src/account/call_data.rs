use crate::{
    errors::KernelAccountError,
    gen::kernel::{
        executeBatchCall, executeCall, executeDelegateCallCall, performCreateCall, Call,
        OPERATION_CALL,
    },
    traits::KernelValidator,
    types::{CallDescriptor, CallRequest, CallType, DeployCall},
    utils::{to_alloy_address, to_alloy_bytes, to_alloy_u256},
};
use alloy::{primitives::U256 as a_U256, sol_types::SolCall};
use ethers::types::{Address, Bytes};

/// Encodes `request` into the kernel account's execution ABI.
pub async fn encode_call_data(
    account_address: Address,
    validator: &dyn KernelValidator,
    request: &CallRequest,
) -> Result<Bytes, KernelAccountError> {
    match request {
        CallRequest::Batch(calls) => encode_batch(calls),
        CallRequest::Single(call) => match call.call_type {
            None | Some(CallType::Call) => {
                if call.to == account_address && validator.should_delegate_via_fallback().await {
                    return Ok(call.data.clone());
                }
                Ok(executeCall {
                    to: to_alloy_address(call.to),
                    value: to_alloy_u256(call.value),
                    data: to_alloy_bytes(&call.data),
                    operation: OPERATION_CALL,
                }
                .abi_encode()
                .into())
            }
            Some(CallType::DelegateCall) => Ok(encode_delegate_call(call.to, &call.data)),
        },
    }
}

fn encode_batch(calls: &[CallDescriptor]) -> Result<Bytes, KernelAccountError> {
    if calls.iter().any(CallDescriptor::is_delegate_call) {
        return Err(KernelAccountError::DelegateCallInBatch);
    }

    Ok(executeBatchCall {
        calls: calls
            .iter()
            .map(|call| Call {
                to: to_alloy_address(call.to),
                value: to_alloy_u256(call.value),
                data: to_alloy_bytes(&call.data),
            })
            .collect(),
    }
    .abi_encode()
    .into())
}

fn encode_delegate_call(to: Address, data: &Bytes) -> Bytes {
    executeDelegateCallCall {
        to: to_alloy_address(to),
        data: to_alloy_bytes(data),
    }
    .abi_encode()
    .into()
}

/// Constructor bytecode followed by the ABI encoded constructor arguments.
pub fn encode_deploy_data(deploy: &DeployCall) -> Result<Bytes, KernelAccountError> {
    match deploy.abi.constructor() {
        Some(constructor) => Ok(constructor
            .encode_input(deploy.bytecode.to_vec(), &deploy.args)?
            .into()),
        None if deploy.args.is_empty() => Ok(deploy.bytecode.clone()),
        None => Err(KernelAccountError::MissingConstructor),
    }
}

/// Deploys a contract from the account by delegate calling `performCreate` on the create-call
/// helper.
pub fn encode_deploy_call_data(
    create_call_address: Address,
    deploy: &DeployCall,
) -> Result<Bytes, KernelAccountError> {
    let perform_create = performCreateCall {
        value: a_U256::ZERO,
        deploymentData: to_alloy_bytes(&encode_deploy_data(deploy)?),
    }
    .abi_encode();

    Ok(encode_delegate_call(
        create_call_address,
        &Bytes::from(perform_create),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockValidator;
    use ethers::{
        abi::{Abi, Token},
        types::U256,
        utils::id,
    };

    fn account() -> Address {
        "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap()
    }

    fn target() -> Address {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    fn data() -> Bytes {
        "0xa9059cbb".parse().unwrap()
    }

    #[tokio::test]
    async fn single_call_uses_execute() {
        let validator = MockValidator::default();
        let call = CallDescriptor::new(target(), U256::from(5), data());

        let encoded = encode_call_data(account(), &validator, &call.into()).await.unwrap();

        assert_eq!(&encoded[..4], &id("execute(address,uint256,bytes,uint8)"));
        let decoded = executeCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(decoded.to, to_alloy_address(target()));
        assert_eq!(decoded.value, a_U256::from(5));
        assert_eq!(decoded.data.to_vec(), data().to_vec());
        assert_eq!(decoded.operation, 0);
    }

    #[tokio::test]
    async fn explicit_call_type_matches_default() {
        let validator = MockValidator::default();
        let implicit = CallDescriptor::new(target(), U256::one(), data());
        let explicit = CallDescriptor {
            call_type: Some(CallType::Call),
            ..implicit.clone()
        };

        assert_eq!(
            encode_call_data(account(), &validator, &implicit.into()).await.unwrap(),
            encode_call_data(account(), &validator, &explicit.into()).await.unwrap()
        );
    }

    #[tokio::test]
    async fn self_call_short_circuits_through_fallback() {
        let validator = MockValidator {
            delegate_via_fallback: true,
            ..Default::default()
        };
        let call = CallDescriptor::new(account(), U256::zero(), data());

        let encoded = encode_call_data(account(), &validator, &call.into()).await.unwrap();
        assert_eq!(encoded, data());
    }

    #[tokio::test]
    async fn self_call_without_fallback_uses_execute() {
        let validator = MockValidator::default();
        let call = CallDescriptor::new(account(), U256::zero(), data());

        let encoded = encode_call_data(account(), &validator, &call.into()).await.unwrap();
        assert_eq!(&encoded[..4], &executeCall::SELECTOR);
    }

    #[tokio::test]
    async fn fallback_only_applies_to_the_account_itself() {
        let validator = MockValidator {
            delegate_via_fallback: true,
            ..Default::default()
        };
        let call = CallDescriptor::new(target(), U256::zero(), data());

        let encoded = encode_call_data(account(), &validator, &call.into()).await.unwrap();
        assert_eq!(&encoded[..4], &executeCall::SELECTOR);
    }

    #[tokio::test]
    async fn single_delegate_call() {
        let validator = MockValidator::default();
        let call = CallDescriptor::delegate(target(), data());

        let encoded = encode_call_data(account(), &validator, &call.into()).await.unwrap();

        assert_eq!(&encoded[..4], &id("executeDelegateCall(address,bytes)"));
        let decoded = executeDelegateCallCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(decoded.to, to_alloy_address(target()));
        assert_eq!(decoded.data.to_vec(), data().to_vec());
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let validator = MockValidator::default();
        let second: Address = "0x2222222222222222222222222222222222222222".parse().unwrap();
        let calls = vec![
            CallDescriptor::new(target(), U256::one(), data()),
            CallDescriptor {
                call_type: Some(CallType::Call),
                ..CallDescriptor::new(second, U256::from(2), Bytes::default())
            },
        ];

        let encoded = encode_call_data(account(), &validator, &calls.into()).await.unwrap();

        assert_eq!(&encoded[..4], &id("executeBatch((address,uint256,bytes)[])"));
        let decoded = executeBatchCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(decoded.calls.len(), 2);
        assert_eq!(decoded.calls[0].to, to_alloy_address(target()));
        assert_eq!(decoded.calls[0].value, a_U256::from(1));
        assert_eq!(decoded.calls[1].to, to_alloy_address(second));
        assert_eq!(decoded.calls[1].value, a_U256::from(2));
        assert!(decoded.calls[1].data.is_empty());
    }

    #[tokio::test]
    async fn batch_rejects_delegate_calls() {
        let validator = MockValidator::default();
        let calls = vec![
            CallDescriptor::new(target(), U256::one(), data()),
            CallDescriptor::delegate(target(), data()),
        ];

        let err = encode_call_data(account(), &validator, &calls.into())
            .await
            .unwrap_err();
        assert!(matches!(err, KernelAccountError::DelegateCallInBatch));
    }

    #[test]
    fn deploy_wraps_perform_create_in_delegate_call() {
        let create_call: Address = crate::consts::CREATE_CALL.parse().unwrap();
        let deploy = DeployCall {
            abi: Abi::default(),
            bytecode: "0x6080604052".parse().unwrap(),
            args: vec![],
        };

        let encoded = encode_deploy_call_data(create_call, &deploy).unwrap();

        let outer = executeDelegateCallCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(outer.to, to_alloy_address(create_call));
        let inner = performCreateCall::abi_decode(&outer.data, true).unwrap();
        assert_eq!(inner.value, a_U256::ZERO);
        assert_eq!(inner.deploymentData.to_vec(), deploy.bytecode.to_vec());
    }

    #[test]
    fn deploy_data_appends_constructor_args() {
        let abi: Abi = serde_json::from_str(
            r#"[{"type":"constructor","inputs":[{"name":"owner","type":"address"}],"stateMutability":"nonpayable"}]"#,
        )
        .unwrap();
        let deploy = DeployCall {
            abi,
            bytecode: "0x6080604052".parse().unwrap(),
            args: vec![Token::Address(target())],
        };

        let data = encode_deploy_data(&deploy).unwrap();
        assert_eq!(&data[..5], &deploy.bytecode[..]);
        assert_eq!(&data[5..], &ethers::abi::encode(&[Token::Address(target())])[..]);
    }

    #[test]
    fn deploy_args_without_constructor_fail() {
        let deploy = DeployCall {
            abi: Abi::default(),
            bytecode: "0x6080604052".parse().unwrap(),
            args: vec![Token::Bool(true)],
        };

        assert!(matches!(
            encode_deploy_data(&deploy),
            Err(KernelAccountError::MissingConstructor)
        ));
    }
}
