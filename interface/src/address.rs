//! Deterministic addresses used by the loader.
//!
//! Two primitives, seed-derived and program-derived addresses, both computed
//! by the ledger crate itself; everything else is built on top of them.

use pubkey::{Pubkey, PubkeyError, MAX_SEED_LEN};

use crate::eth_tx::keccak256;
use crate::{EncodingError, EtherAddress, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};

pub const DEPOSIT_SEED: &[u8] = b"Deposit";
pub const COLLATERAL_SEED_PREFIX: &str = "collateral_seed_";
pub const HOLDER_SEED_PREFIX: &[u8] = b"holder";

/// # Derive With Seed
///
/// `sha256(base || seed || owner)`, identical to the ledger's `create_with_seed`.
pub fn derive_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Pubkey, EncodingError> {
    if seed.len() > MAX_SEED_LEN {
        return Err(EncodingError::InvalidSeedLength {
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }
    Pubkey::create_with_seed(base, seed, owner).map_err(|err| match err {
        PubkeyError::IllegalOwner => EncodingError::IllegalOwner,
        _ => EncodingError::InvalidSeedLength {
            len: seed.len(),
            max: MAX_SEED_LEN,
        },
    })
}

/// Program derived address together with its bump seed.
pub fn derive_program_address(seeds: &[&[u8]], program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(seeds, program)
}

/// Loader account that backs an Ethereum address.
pub fn ether_to_program(ether: &EtherAddress, loader: &Pubkey, seed_version: u8) -> (Pubkey, u8) {
    derive_program_address(&[&[seed_version], ether.as_ref()], loader)
}

/// Seed string for accounts derived from an Ethereum address.
pub fn ether_to_seed(ether: &EtherAddress) -> String {
    bs58::encode(ether.as_ref()).into_string()
}

/// Code account of a contract, seed-derived from the operator `base`.
pub fn ether_to_code_account(
    base: &Pubkey,
    ether: &EtherAddress,
    loader: &Pubkey,
) -> Result<Pubkey, EncodingError> {
    derive_with_seed(base, &ether_to_seed(ether), loader)
}

/// Seed of the storage account for a signed transaction: hex of the first
/// eight signature bytes.
pub fn storage_seed(signature: &[u8]) -> String {
    hex::encode(&signature[..signature.len().min(8)])
}

/// Seed of holder account `id`: first 32 hex characters of
/// `keccak256("holder" || id)`, with `id` as minimal big-endian bytes.
pub fn holder_seed(id: u64) -> String {
    let bytes = id.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let digest = keccak256(&[HOLDER_SEED_PREFIX, &bytes[start..]].concat());
    hex::encode(&digest[..16])
}

/// Holder account `id` of the operator `base`.
pub fn holder_address(base: &Pubkey, id: u64, loader: &Pubkey) -> Result<Pubkey, EncodingError> {
    derive_with_seed(base, &holder_seed(id), loader)
}

pub fn deposit_authority(loader: &Pubkey) -> (Pubkey, u8) {
    derive_program_address(&[DEPOSIT_SEED], loader)
}

pub fn collateral_pool_address(
    base: &Pubkey,
    index: u32,
    loader: &Pubkey,
) -> Result<Pubkey, EncodingError> {
    derive_with_seed(base, &format!("{COLLATERAL_SEED_PREFIX}{index}"), loader)
}

pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    let seeds: [&[u8]; 3] = [wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()];
    derive_program_address(&seeds, &ASSOCIATED_TOKEN_PROGRAM_ID).0
}
