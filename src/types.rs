use crate::errors::KernelAccountError;
use ethers::{
    abi::{Abi, Token},
    types::{Address, Bytes, U256},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Serialize)]
pub struct Request<T> {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: T,
}

impl<T> Request<T> {
    pub fn new(method: impl Into<String>, params: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Response<R> {
    pub jsonrpc: String,
    pub id: u64,
    pub result: R,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[allow(dead_code)]
    pub(crate) jsonrpc: String,
    #[allow(dead_code)]
    pub(crate) id: u64,
    pub(crate) error: JsonRpcError,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// How a single call is executed by the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CallType {
    Call,
    DelegateCall,
}

impl FromStr for CallType {
    type Err = KernelAccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(CallType::Call),
            "delegatecall" => Ok(CallType::DelegateCall),
            _ => Err(KernelAccountError::InvalidCallType(s.to_string())),
        }
    }
}

impl TryFrom<String> for CallType {
    type Error = KernelAccountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CallType> for String {
    fn from(value: CallType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallType::Call => f.write_str("call"),
            CallType::DelegateCall => f.write_str("delegatecall"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    pub to: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<CallType>,
}

impl CallDescriptor {
    pub fn new(to: Address, value: U256, data: Bytes) -> Self {
        Self {
            to,
            value,
            data,
            call_type: None,
        }
    }

    pub fn delegate(to: Address, data: Bytes) -> Self {
        Self {
            to,
            value: U256::zero(),
            data,
            call_type: Some(CallType::DelegateCall),
        }
    }

    pub fn is_delegate_call(&self) -> bool {
        self.call_type == Some(CallType::DelegateCall)
    }
}

/// One call or an ordered batch of calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallRequest {
    Single(CallDescriptor),
    Batch(Vec<CallDescriptor>),
}

impl From<CallDescriptor> for CallRequest {
    fn from(value: CallDescriptor) -> Self {
        CallRequest::Single(value)
    }
}

impl From<Vec<CallDescriptor>> for CallRequest {
    fn from(value: Vec<CallDescriptor>) -> Self {
        CallRequest::Batch(value)
    }
}

/// Contract deployment performed from the account.
#[derive(Debug, Clone)]
pub struct DeployCall {
    pub abi: Abi,
    pub bytecode: Bytes,
    pub args: Vec<Token>,
}

/// Gas prices applied to a user operation; their estimation is left to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasFees {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}
