//! Subcommand implementations

pub mod account;
pub mod config;
pub mod storage;

use tez_e2e::TestHarness;
use tez_sdk::TezosClient;
use tracing::info;

use crate::{CliError, Config};

/// Connect to the configured node and load the deployed token
async fn connect_harness(config: &Config) -> Result<TestHarness, CliError> {
    let deployment = tez_e2e::Deployment::load(&config.deployment)?;
    let client = TezosClient::connect(&config.rpc_url).await?;
    info!(rpc = %config.rpc_url, token = %deployment.address, "connected");
    Ok(TestHarness::new(client, deployment.address, config.policy()).await?)
}
