use crate::{errors::KernelAccountError, traits::ChainReader};
use ethers::types::{Address, Bytes};
use std::future::Future;

/// Resolves the account address, deriving it from the init code unless it is already known.
///
/// `init_code` is only invoked when `deployed_account_address` is `None`.
pub async fn resolve_address<R, F, Fut>(
    reader: &R,
    entry_point: Address,
    deployed_account_address: Option<Address>,
    init_code: F,
) -> Result<Address, KernelAccountError>
where
    R: ChainReader + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Bytes, KernelAccountError>>,
{
    if let Some(address) = deployed_account_address {
        return Ok(address);
    }

    let init_code = init_code().await?;
    let address = reader
        .get_sender_address(init_code, entry_point)
        .await?
        .ok_or(KernelAccountError::AccountAddressNotFound)?;

    log::debug!("derived kernel account address {:?}", address);
    Ok(address)
}
