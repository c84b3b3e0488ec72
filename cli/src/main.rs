use common::config::Config;
use common::types::HarnessResult;

use args::{Cli, LoaderCommand};
use commands::Context;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> HarnessResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::from_args();
    let base = match &cli.config {
        Some(path) => Config::from_path(path.clone())?,
        None => Config::default(),
    };
    let config = apply_flags(base.with_env_overrides()?, &cli);
    let loader = match cli.command.evm_loader() {
        Some(loader) => loader,
        None => config.evm_loader()?,
    };
    tracing::debug!(url = %config.connection.solana_url, %loader, "resolved configuration");
    let ctx = Context::new(config, loader);

    match cli.command {
        LoaderCommand::Deposit { amount, address, .. } => {
            commands::deposit(&ctx, amount, address).await?
        }
        LoaderCommand::GetEtherAccountData { address, .. } => {
            commands::get_ether_account_data(&ctx, address).await?
        }
        LoaderCommand::CreateProgramAddress { address, .. } => {
            commands::create_program_address(&ctx, address)
        }
        LoaderCommand::WriteHolder {
            file,
            holder,
            nonce,
            ..
        } => commands::write_holder(&ctx, file, holder, nonce).await?,
        LoaderCommand::BlockHashes { .. } => commands::block_hashes(&ctx).await?,
    }
    Ok(())
}

/// Command-line flags win over the environment and the file.
fn apply_flags(mut config: Config, cli: &Cli) -> Config {
    if let Some(url) = &cli.url {
        config.connection.solana_url = url.clone();
    }
    if let Some(commitment) = cli.commitment {
        config.connection.commitment = commitment;
    }
    if let Some(keypair) = &cli.keypair {
        config.paths.keypair = keypair.clone();
    }
    config
}

mod args;
mod commands;
