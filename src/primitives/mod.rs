pub mod user_operation;

pub use user_operation::{UserOperation, UserOperationGasEstimation, UserOperationHash};
