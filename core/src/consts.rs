pub const SOLANA_URL_ENV: &str = "SOLANA_URL";
pub const EVM_LOADER_ENV: &str = "EVM_LOADER";
pub const ETH_TOKEN_MINT_ENV: &str = "ETH_TOKEN_MINT";
pub const CONTRACTS_DIR_ENV: &str = "CONTRACTS_DIR";
pub const PROXY_ENDPOINT_ENV: &str = "PROXY_ENDPOINT";

pub const DEFAULT_SOLANA_URL: &str = "http://localhost:8899";
pub const DEFAULT_CONTRACTS_DIR: &str = "evm_loader/";
pub const DEFAULT_KEYPAIR_PATH: &str = ".config/solana/id.json";

pub const DEFAULT_ACCOUNT_SEED_VERSION: u8 = 1;
pub const DEFAULT_CHAIN_ID: u64 = 111;

/// Wait before the first confirmation poll, milliseconds.
pub const DEFAULT_FIRST_WAIT_MS: u64 = 7_000;
/// Wait between subsequent confirmation polls, milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
/// Hard ceiling for a single confirmation, milliseconds.
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 30_000;
