use std::path::PathBuf;
use std::time::Duration;

use pubkey::Pubkey;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, DurationMilliSeconds};

use crate::consts::*;
use crate::types::{Commitment, HarnessResult, Url};

/// # Config
///
/// Settings shared by the harness and the command-line tool. Loaded once per
/// process from a TOML file and/or the environment, then passed by reference.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub connection: ConnectionSettings,
    pub loader: LoaderSettings,
    pub confirmation: ConfirmationSettings,
    pub paths: PathSettings,
    pub proxy_endpoint: Option<Url>,
}

impl Config {
    pub fn from_path(path: PathBuf) -> HarnessResult<Self> {
        let config = std::fs::read_to_string(path)?;
        toml::from_str(&config).map_err(Into::into)
    }

    /// # From Environment
    ///
    /// Builds the default configuration and applies the environment overrides.
    pub fn from_env() -> HarnessResult<Self> {
        Self::default().with_env_overrides()
    }

    /// # Environment Overrides
    ///
    /// Replaces values with the ones set in the process environment, which
    /// always win over the file.
    pub fn with_env_overrides(self) -> HarnessResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides taken from `lookup`, keyed by environment variable name.
    /// Empty values count as unset.
    pub fn with_overrides<F>(mut self, lookup: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(url) = var(SOLANA_URL_ENV) {
            tracing::debug!(%url, "solana url taken from environment");
            self.connection.solana_url = url.parse()?;
        }
        if let Some(loader) = var(EVM_LOADER_ENV) {
            self.loader.evm_loader = Some(loader.parse()?);
        }
        if let Some(mint) = var(ETH_TOKEN_MINT_ENV) {
            self.loader.eth_token_mint = Some(mint.parse()?);
        }
        if let Some(dir) = var(CONTRACTS_DIR_ENV) {
            self.paths.contracts_dir = dir.into();
        }
        if let Some(endpoint) = var(PROXY_ENDPOINT_ENV) {
            self.proxy_endpoint = Some(endpoint.parse()?);
        }
        Ok(self)
    }

    pub fn evm_loader(&self) -> HarnessResult<Pubkey> {
        self.loader
            .evm_loader
            .ok_or_else(|| format!("evm loader address is not configured, set {EVM_LOADER_ENV}").into())
    }

    pub fn eth_token_mint(&self) -> HarnessResult<Pubkey> {
        self.loader
            .eth_token_mint
            .ok_or_else(|| format!("eth token mint is not configured, set {ETH_TOKEN_MINT_ENV}").into())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConnectionSettings {
    pub solana_url: Url,
    pub commitment: Commitment,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            solana_url: Url(hyper::Uri::from_static(DEFAULT_SOLANA_URL)),
            commitment: Commitment::default(),
        }
    }
}

#[serde_as]
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoaderSettings {
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub evm_loader: Option<Pubkey>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub eth_token_mint: Option<Pubkey>,
    pub account_seed_version: u8,
    pub chain_id: u64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            evm_loader: None,
            eth_token_mint: None,
            account_seed_version: DEFAULT_ACCOUNT_SEED_VERSION,
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

/// # Confirmation Settings
///
/// Poll schedule of the confirmation engine, in milliseconds in the file.
#[serde_as]
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConfirmationSettings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub first_wait: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub interval: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            first_wait: Duration::from_millis(DEFAULT_FIRST_WAIT_MS),
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: Duration::from_millis(DEFAULT_CONFIRMATION_TIMEOUT_MS),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "kebab-case", default)]
pub struct PathSettings {
    pub contracts_dir: PathBuf,
    pub keypair: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
        Self {
            contracts_dir: DEFAULT_CONTRACTS_DIR.into(),
            keypair: home.join(DEFAULT_KEYPAIR_PATH),
        }
    }
}
