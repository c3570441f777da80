use alloy::sol;

// Kernel v2 account. See https://github.com/zerodevapp/kernel/blob/v2.2/src/Kernel.sol
sol! {
    struct Call {
        address to;
        uint256 value;
        bytes data;
    }

    function execute(address to, uint256 value, bytes data, uint8 operation);

    function executeBatch(Call[] calls);

    function executeDelegateCall(address to, bytes data);

    function initialize(address _defaultValidator, bytes _data);

    function eip712Domain() external view returns (
        bytes1 fields,
        string name,
        string version,
        uint256 chainId,
        address verifyingContract,
        bytes32 salt,
        uint256[] extensions
    );
}

// Kernel v2 factory
sol! {
    function createAccount(address _implementation, bytes _data, uint256 _index) returns (address proxy);
}

// CREATE helper, reached from the account through `executeDelegateCall`
sol! {
    function performCreate(uint256 value, bytes deploymentData) returns (address newContract);
}

/// `Operation` enum of the kernel `execute` entry
pub const OPERATION_CALL: u8 = 0;
