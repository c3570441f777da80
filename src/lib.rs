pub mod account;
pub mod client;
pub mod config;
pub mod consts;
pub mod errors;
pub mod gen;
pub mod primitives;
pub mod reader;
pub mod traits;
pub mod types;
pub mod utils;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_utils;

pub use account::{create_kernel_account, KernelAccountOptions, KernelSmartAccount};
pub use client::KernelAccountClient;
pub use config::KernelConfig;
pub use errors::{BundlerClientError, ConfigurationError, KernelAccountError, TypedDataError};
pub use primitives::{UserOperation, UserOperationGasEstimation, UserOperationHash};
pub use reader::ProviderReader;
pub use traits::{ChainReader, KernelValidator};
pub use types::{CallDescriptor, CallRequest, CallType, DeployCall, GasFees};
pub use validator::EcdsaValidator;
