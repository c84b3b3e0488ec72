//! Client-side wire format of the EVM loader program: instruction encoding,
//! account lists, address derivation and account layouts.

use pubkey::Pubkey;

pub use codec::LoaderInstruction;
pub use error::EncodingError;
pub use eth_tx::{EthTransaction, SignedEthTransaction};
pub use ether::EtherAddress;

pub const SYSTEM_PROGRAM_ID: Pubkey = solana_system_interface::program::ID;
pub const TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
pub const SECP256K1_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("KeccakSecp256k11111111111111111111111111111");
pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("ComputeBudget111111111111111111111111111111");
pub const SYSVAR_INSTRUCTIONS_ID: Pubkey =
    Pubkey::from_str_const("Sysvar1nstructions1111111111111111111111111");
pub const SYSVAR_RECENT_BLOCKHASHES_ID: Pubkey =
    Pubkey::from_str_const("SysvarRecentB1ockHashes11111111111111111111");

pub mod account;
pub mod address;
pub mod builders;
pub mod codec;
pub mod error;
pub mod eth_tx;
pub mod ether;
pub mod pack;
pub mod programs;
