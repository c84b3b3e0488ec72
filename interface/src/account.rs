use ethnum::U256;

use crate::ether::ETHER_ADDRESS_LEN;
use crate::pack::Reader;
use crate::{EncodingError, EtherAddress};

/// # Ether Account Data
///
/// Loader account backing an Ethereum address:
/// `tag(1) address(20) bump_seed(1) trx_count(8) balance(32) generation(4)
/// code_size(4) rw_blocked(1)`, integers little endian, followed by
/// `code_size` bytes of contract code when the account carries its code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EtherAccountData {
    pub tag: u8,
    pub address: EtherAddress,
    pub bump_seed: u8,
    pub trx_count: u64,
    pub balance: U256,
    pub generation: u32,
    pub code_size: u32,
    pub rw_blocked: bool,
    /// Empty when the account holds no code bytes.
    pub code: Vec<u8>,
}

impl EtherAccountData {
    pub const SIZE: usize = 1 + ETHER_ADDRESS_LEN + 1 + 8 + 32 + 4 + 4 + 1;

    pub fn unpack(data: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = Reader::new(data);
        let mut account = Self {
            tag: reader.u8("tag")?,
            address: EtherAddress(reader.array("address")?),
            bump_seed: reader.u8("bump_seed")?,
            trx_count: reader.u64("trx_count")?,
            balance: U256::from_le_bytes(reader.array("balance")?),
            generation: reader.u32("generation")?,
            code_size: reader.u32("code_size")?,
            rw_blocked: reader.u8("rw_blocked")? != 0,
            code: Vec::new(),
        };
        if !reader.rest_is_empty() {
            account.code = reader.take(account.code_size as usize, "code")?.to_vec();
        }
        Ok(account)
    }
}
