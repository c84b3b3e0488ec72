use std::path::PathBuf;

use common::types::{Commitment, Url};
use interface::EtherAddress;
use pubkey::Pubkey;
use structopt::StructOpt;

/// # Loader Command-Line Interface
///
/// Operator utility for a deployed EVM loader. Global options override the
/// configuration file and the environment.
#[derive(StructOpt, Debug)]
#[structopt(name = "loader-cli", rename_all = "kebab-case")]
pub struct Cli {
    /// JSON-RPC url of the node
    #[structopt(long, global = true)]
    pub url: Option<Url>,
    /// Path to the payer keypair
    #[structopt(long, global = true, parse(from_os_str))]
    pub keypair: Option<PathBuf>,
    /// Path to a TOML configuration file
    #[structopt(long, global = true, parse(from_os_str))]
    pub config: Option<PathBuf>,
    /// Commitment used for queries: processed, confirmed or finalized
    #[structopt(long, global = true)]
    pub commitment: Option<Commitment>,
    #[structopt(subcommand)]
    pub command: LoaderCommand,
}

#[derive(StructOpt, Debug)]
#[structopt(rename_all = "kebab-case")]
pub enum LoaderCommand {
    /// ## Deposit
    ///
    /// Approves `amount` tokens to the deposit authority and deposits them
    /// into the loader account of `address`.
    Deposit {
        amount: u64,
        address: EtherAddress,
        #[structopt(long = "evm_loader")]
        evm_loader: Option<Pubkey>,
    },
    /// ## Get Ether Account Data
    ///
    /// Prints the decoded loader account backing `address`.
    GetEtherAccountData {
        address: EtherAddress,
        #[structopt(long = "evm_loader")]
        evm_loader: Option<Pubkey>,
    },
    /// Prints the program address of `address` and its bump seed.
    CreateProgramAddress {
        address: EtherAddress,
        #[structopt(long = "evm_loader")]
        evm_loader: Option<Pubkey>,
    },
    /// ## Write Holder
    ///
    /// Stages a signed Ethereum transaction into a holder account. The file
    /// holds the raw transaction in hex, with or without a `0x` prefix. The
    /// holder defaults to the operator's holder account for `nonce`.
    WriteHolder {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
        #[structopt(long)]
        holder: Option<Pubkey>,
        #[structopt(long, default_value = "0")]
        nonce: u64,
        #[structopt(long = "evm_loader")]
        evm_loader: Option<Pubkey>,
    },
    /// Submits `GetBlockHashes` and prints the confirmation logs.
    BlockHashes {
        #[structopt(long = "evm_loader")]
        evm_loader: Option<Pubkey>,
    },
}

impl LoaderCommand {
    pub fn evm_loader(&self) -> Option<Pubkey> {
        match self {
            LoaderCommand::Deposit { evm_loader, .. }
            | LoaderCommand::GetEtherAccountData { evm_loader, .. }
            | LoaderCommand::CreateProgramAddress { evm_loader, .. }
            | LoaderCommand::WriteHolder { evm_loader, .. }
            | LoaderCommand::BlockHashes { evm_loader } => *evm_loader,
        }
    }
}
