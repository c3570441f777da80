/// EntryPoint v0.6, deployed at the same address on every supported chain
pub const ENTRY_POINT_V06: &str = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789";
/// Kernel v2 account factory
pub const KERNEL_FACTORY: &str = "0x5de4839a76cf55d0c90e2061ef4386d962E15ae3";
/// Kernel v2.2 account logic (proxy implementation)
pub const KERNEL_ACCOUNT_LOGIC: &str = "0x0DA6a956B9488eD4dd761E59f52FDc6c8068E6B5";
/// Kernel ECDSA validator
pub const ECDSA_VALIDATOR: &str = "0xd9AB5096a832b9ce79914329DAEE236f8Eea0390";
/// Helper contract exposing `performCreate`, reached through `executeDelegateCall`
pub const CREATE_CALL: &str = "0x9b35Af71d77eaf8d7e40252370304687390A1A52";

/// EIP-712 domain name and version of the kernel account, used for plugin approvals
pub const KERNEL_NAME: &str = "Kernel";
pub const KERNEL_VERSION: &str = "0.2.2";

pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
pub const VALIDATOR_APPROVED_TYPE: &str =
    "ValidatorApproved(bytes4 sig,uint256 validatorData,address executor,bytes enableData)";

/// Tag reported by `KernelSmartAccount::source`
pub const KERNEL_ACCOUNT_SOURCE: &str = "kernelSmartAccount";

/// Signature validation modes understood by the kernel account
pub const SUDO_MODE: [u8; 4] = [0x00, 0x00, 0x00, 0x00];
pub const ENABLE_MODE: [u8; 4] = [0x00, 0x00, 0x00, 0x02];

/// Well-formed ECDSA signature used for gas estimation
pub const DUMMY_ECDSA_SIGNATURE: &str =
    "0xfffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c";
