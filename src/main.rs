use anyhow::Result;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, U256},
};
use kernel_account::{
    consts::{ECDSA_VALIDATOR, ENTRY_POINT_V06},
    create_kernel_account,
    utils::address_or,
    CallDescriptor, EcdsaValidator, GasFees, KernelAccountClient, KernelAccountOptions,
    KernelConfig, ProviderReader,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let config = KernelConfig::from_env()?;

    let provider = Arc::new(Provider::<Http>::try_from(config.rpc_url.as_str())?);
    let reader = Arc::new(ProviderReader::new(provider.clone()));

    let validator = EcdsaValidator::new(
        config.owner.clone(),
        address_or(config.validator_address, ECDSA_VALIDATOR)?,
        address_or(config.entry_point, ENTRY_POINT_V06)?,
        config.chain_id,
    );
    let options = KernelAccountOptions {
        entry_point: config.entry_point,
        factory_address: config.factory_address,
        account_logic_address: config.account_logic_address,
        deployed_account_address: config.deployed_account_address,
        ..KernelAccountOptions::new(Arc::new(validator)).index(config.account_index)
    };

    let account = create_kernel_account(reader, options).await?;
    log::info!("kernel account: {:?}", account.address());

    let client = KernelAccountClient::new(account, config.bundler_url.clone());
    let entry_points = client.supported_entry_points().await?;
    log::info!("bundler entry points: {:?}", entry_points);

    let (max_fee_per_gas, max_priority_fee_per_gas) = provider.estimate_eip1559_fees(None).await?;
    let fees = GasFees {
        max_fee_per_gas,
        max_priority_fee_per_gas,
    };

    // Self transfer of zero value unless a target is given
    let to: Address = match env::var("TO_ADDRESS") {
        Ok(to) => to.parse()?,
        Err(_) => client.account().address(),
    };
    let value = match env::var("VALUE_WEI") {
        Ok(value) => U256::from_dec_str(&value)?,
        Err(_) => U256::zero(),
    };

    let hash = client
        .send_transactions(&CallDescriptor::new(to, value, Default::default()).into(), fees)
        .await?;
    println!("user operation hash: {:?}", hash.0);
    Ok(())
}
