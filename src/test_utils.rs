use crate::{errors::KernelAccountError, primitives::UserOperation, traits::*};
use async_trait::async_trait;
use ethers::{
    abi::{encode, Token},
    types::{Address, Bytes, U256},
};
use parking_lot::Mutex;

/// Canned chain state; every call returns `domain`.
#[derive(Debug, Default)]
pub struct MockReader {
    pub code: Bytes,
    pub nonce: U256,
    pub sender_address: Option<Address>,
    pub domain: Bytes,
    pub calls: Mutex<Vec<(Address, Bytes)>>,
    pub init_codes: Mutex<Vec<Bytes>>,
}

#[async_trait]
impl ChainReader for MockReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, KernelAccountError> {
        self.calls.lock().push((to, data));
        Ok(self.domain.clone())
    }

    async fn get_code(&self, _address: Address) -> Result<Bytes, KernelAccountError> {
        Ok(self.code.clone())
    }

    async fn get_nonce(
        &self,
        _sender: Address,
        _entry_point: Address,
    ) -> Result<U256, KernelAccountError> {
        Ok(self.nonce)
    }

    async fn get_sender_address(
        &self,
        init_code: Bytes,
        _entry_point: Address,
    ) -> Result<Option<Address>, KernelAccountError> {
        self.init_codes.lock().push(init_code);
        Ok(self.sender_address)
    }
}

#[derive(Debug)]
pub struct MockValidator {
    pub address: Address,
    pub signer_address: Address,
    pub enable_data: Bytes,
    pub delegate_via_fallback: bool,
    pub enable_signature: Bytes,
    pub signed: Mutex<Vec<Vec<u8>>>,
    pub plugin_requests: Mutex<Vec<(Address, Address)>>,
}

impl Default for MockValidator {
    fn default() -> Self {
        Self {
            address: Address::repeat_byte(0x11),
            signer_address: Address::repeat_byte(0x22),
            enable_data: Bytes::from(vec![0x22u8; 20]),
            delegate_via_fallback: false,
            enable_signature: Bytes::from(vec![0xeeu8; 65]),
            signed: Mutex::new(vec![]),
            plugin_requests: Mutex::new(vec![]),
        }
    }
}

impl MockValidator {
    /// Signature `sign_message` returns for `message`.
    pub fn expected_signature(&self, message: &[u8]) -> Bytes {
        [b"sig".as_slice(), message].concat().into()
    }

    fn tagged(tag: u8, enable_signature: Option<&Bytes>) -> Bytes {
        let mut signature = vec![tag];
        if let Some(enable_signature) = enable_signature {
            signature.extend_from_slice(enable_signature);
        }
        signature.into()
    }
}

#[async_trait]
impl KernelValidator for MockValidator {
    fn address(&self) -> Address {
        self.address
    }

    fn signer_address(&self) -> Address {
        self.signer_address
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, KernelAccountError> {
        self.signed.lock().push(message.to_vec());
        Ok(self.expected_signature(message))
    }

    async fn get_enable_data(&self) -> Result<Bytes, KernelAccountError> {
        Ok(self.enable_data.clone())
    }

    async fn sign_user_operation(
        &self,
        _user_operation: &UserOperation,
        enable_signature: Option<&Bytes>,
    ) -> Result<Bytes, KernelAccountError> {
        Ok(Self::tagged(0xaa, enable_signature))
    }

    async fn get_dummy_signature(
        &self,
        _user_operation: &UserOperation,
        enable_signature: Option<&Bytes>,
    ) -> Result<Bytes, KernelAccountError> {
        Ok(Self::tagged(0xdd, enable_signature))
    }

    async fn should_delegate_via_fallback(&self) -> bool {
        self.delegate_via_fallback
    }

    async fn get_plugin_enable_signature(
        &self,
        account_address: Address,
        plugin: &dyn KernelValidator,
    ) -> Result<Bytes, KernelAccountError> {
        self.plugin_requests
            .lock()
            .push((account_address, plugin.address()));
        Ok(self.enable_signature.clone())
    }
}

/// Return data of `eip712Domain()` as the kernel logic contract would produce it.
pub fn encode_domain(
    name: &str,
    version: &str,
    chain_id: u64,
    verifying_contract: Address,
    salt: [u8; 32],
    extensions: Vec<U256>,
) -> Bytes {
    encode(&[
        Token::FixedBytes(vec![0x0f]),
        Token::String(name.to_string()),
        Token::String(version.to_string()),
        Token::Uint(U256::from(chain_id)),
        Token::Address(verifying_contract),
        Token::FixedBytes(salt.to_vec()),
        Token::Array(extensions.into_iter().map(Token::Uint).collect()),
    ])
    .into()
}
