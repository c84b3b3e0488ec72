use std::fmt;
use std::str::FromStr;

use crate::EncodingError;

pub const ETHER_ADDRESS_LEN: usize = 20;

/// 20-byte Ethereum-style address. Parsed from hex with an optional `0x`
/// prefix, displayed `0x`-prefixed in lowercase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EtherAddress(pub [u8; ETHER_ADDRESS_LEN]);

impl EtherAddress {
    pub fn as_bytes(&self) -> &[u8; ETHER_ADDRESS_LEN] {
        &self.0
    }
}

impl From<[u8; ETHER_ADDRESS_LEN]> for EtherAddress {
    fn from(bytes: [u8; ETHER_ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for EtherAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for EtherAddress {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EncodingError::InvalidEtherAddress(s.to_owned());
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| invalid())?;
        let bytes: [u8; ETHER_ADDRESS_LEN] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for EtherAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
