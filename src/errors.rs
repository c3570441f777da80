use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no default validator or plugin provided")]
    NoValidator,

    #[error("no init code or default validator provided")]
    NoInitCode,

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypedDataError {
    #[error("primary type {0} is not declared in types")]
    UnknownPrimaryType(String),

    #[error("typed data domain has no fields set")]
    EmptyDomain,

    #[error("field {field} of {owner} has unresolvable type {ty}")]
    UnknownFieldType { owner: String, field: String, ty: String },

    #[error("field {field} of {owner} has malformed type {ty}")]
    MalformedFieldType { owner: String, field: String, ty: String },

    #[error("{owner} declares field {field} more than once")]
    DuplicateField { owner: String, field: String },

    #[error("message is missing field {0}")]
    MissingMessageField(String),

    #[error("message carries undeclared field {0}")]
    UndeclaredMessageField(String),

    #[error("failed to hash typed data: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum KernelAccountError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("account address not found")]
    AccountAddressNotFound,

    #[error("sign transaction not supported by smart account")]
    SignTransactionNotSupported,

    #[error("batch delegate call is not supported")]
    DelegateCallInBatch,

    #[error("invalid call type: {0}")]
    InvalidCallType(String),

    #[error(transparent)]
    TypedData(#[from] TypedDataError),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("signer error: {0}")]
    Signer(String),

    #[error("abi error: {0}")]
    Abi(#[from] ethers::abi::Error),

    #[error("failed to decode contract response: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    #[error("deployment args given for a contract without constructor")]
    MissingConstructor,
}

#[derive(Debug, Error)]
pub enum BundlerClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Account(#[from] KernelAccountError),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("Pre-verification gas not enough: calculated: {0}, provided: {1}")]
    PreVerificationGasError(u64, u64),

    #[error("Call gas limit not enough: calculated: {0}, provided: {1}")]
    CallGasLimitError(u64, u64),

    #[error("Verification gas limit not enough")]
    VerificationGasLimitError,

    #[error("bundler rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("bundler response carries neither result nor error")]
    EmptyResponse,
}
