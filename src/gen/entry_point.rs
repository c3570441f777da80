use alloy::sol;
use ethers::contract::abigen;

abigen!(
    EntryPoint,
    r#"[
        function getNonce(address sender, uint192 key) external view returns (uint256 nonce)
    ]"#,
);

// `getSenderAddress` always reverts; the derived address travels in the revert data.
sol! {
    function getSenderAddress(bytes initCode);

    error SenderAddressResult(address sender);
}
