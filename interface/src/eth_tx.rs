//! Legacy Ethereum transactions with EIP-155 replay protection.
//!
//! The loader verifies the secp256k1 signature over `keccak256(message)`,
//! where `message` is the RLP of the transaction fields followed by
//! `chain_id, "", ""`. This module produces that message, signs it and
//! recovers the sender of raw signed transactions.

use ethnum::U256;
use libsecp256k1::{Message, PublicKey, RecoveryId, SecretKey, Signature};
use rlp::{Rlp, RlpStream};
use sha3::{Digest, Keccak256};

use crate::codec::SIGNATURE_LEN;
use crate::ether::ETHER_ADDRESS_LEN;
use crate::{EncodingError, EtherAddress, LoaderInstruction};

const FIELDS: usize = 9;
const EIP155_OFFSET: u64 = 35;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// # Ethereum Transaction
///
/// Unsigned legacy transaction. `to` is `None` for contract deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Option<EtherAddress>,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl EthTransaction {
    /// Signing payload, the bytes carried as `message` by the loader calls.
    pub fn message(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(FIELDS);
        self.append_fields(&mut stream);
        stream.append(&self.chain_id);
        stream.append_empty_data();
        stream.append_empty_data();
        stream.out().to_vec()
    }

    pub fn hash(&self) -> [u8; 32] {
        keccak256(&self.message())
    }

    /// # Sign
    ///
    /// Signs with a raw secp256k1 secret key. Nonces are deterministic, so the
    /// same transaction and key always give the same signature.
    pub fn sign(self, secret: &[u8; 32]) -> Result<SignedEthTransaction, EncodingError> {
        let secret = SecretKey::parse(secret).map_err(signature_error)?;
        let message = self.message();
        let (signature, recovery_id) =
            libsecp256k1::sign(&Message::parse(&keccak256(&message)), &secret);

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&signature.serialize());
        bytes[64] = recovery_id.serialize();
        Ok(SignedEthTransaction {
            from: address_of(&PublicKey::from_secret_key(&secret)),
            signature: bytes,
            message,
            transaction: self,
        })
    }

    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        append_uint(stream, &self.gas_price);
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => stream.append(&to.0.to_vec()),
            None => stream.append_empty_data(),
        };
        append_uint(stream, &self.value);
        stream.append(&self.data);
    }
}

/// # Signed Ethereum Transaction
///
/// The `(from, signature, message)` triple consumed by `CallFromRawEthereumTx`
/// and holder staging, together with the decoded fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedEthTransaction {
    pub transaction: EthTransaction,
    pub from: EtherAddress,
    /// `r || s || recovery_id`
    pub signature: [u8; SIGNATURE_LEN],
    pub message: Vec<u8>,
}

impl SignedEthTransaction {
    pub fn v(&self) -> u64 {
        self.transaction.chain_id * 2 + EIP155_OFFSET + u64::from(self.signature[64])
    }

    /// Network encoding, as accepted by `eth_sendRawTransaction`.
    pub fn raw(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(FIELDS);
        self.transaction.append_fields(&mut stream);
        stream.append(&self.v());
        stream.append(&trim_leading_zeros(&self.signature[..32]).to_vec());
        stream.append(&trim_leading_zeros(&self.signature[32..64]).to_vec());
        stream.out().to_vec()
    }

    /// # From Raw
    ///
    /// Decodes a raw signed transaction and recovers its sender. Only EIP-155
    /// signatures are accepted since the message embeds the chain id.
    pub fn from_raw(raw: &[u8]) -> Result<Self, EncodingError> {
        let rlp = Rlp::new(raw);
        let count = rlp.item_count().map_err(rlp_error)?;
        if count != FIELDS {
            return Err(EncodingError::InvalidRlp(format!(
                "expected {FIELDS} transaction fields, found {count}"
            )));
        }

        let v: u64 = rlp.val_at(6).map_err(rlp_error)?;
        if v < EIP155_OFFSET {
            return Err(EncodingError::InvalidSignature(format!(
                "v = {v} carries no chain id"
            )));
        }
        let to = match bytes_at(&rlp, 3)? {
            bytes if bytes.is_empty() => None,
            bytes => {
                let address: [u8; ETHER_ADDRESS_LEN] = bytes
                    .try_into()
                    .map_err(|_| EncodingError::InvalidRlp("recipient is not 20 bytes".into()))?;
                Some(EtherAddress(address))
            }
        };
        let transaction = EthTransaction {
            nonce: rlp.val_at(0).map_err(rlp_error)?,
            gas_price: U256::from_be_bytes(word_at(&rlp, 1)?),
            gas_limit: rlp.val_at(2).map_err(rlp_error)?,
            to,
            value: U256::from_be_bytes(word_at(&rlp, 4)?),
            data: bytes_at(&rlp, 5)?,
            chain_id: (v - EIP155_OFFSET) / 2,
        };

        let mut signature = [0u8; SIGNATURE_LEN];
        signature[..32].copy_from_slice(&word_at(&rlp, 7)?);
        signature[32..64].copy_from_slice(&word_at(&rlp, 8)?);
        signature[64] = ((v - EIP155_OFFSET) % 2) as u8;

        let message = transaction.message();
        let from = recover_sender(&keccak256(&message), &signature)?;
        Ok(Self {
            transaction,
            from,
            signature,
            message,
        })
    }

    /// Loader call executing this transaction directly.
    pub fn call(&self, collateral_pool_index: u32) -> LoaderInstruction {
        LoaderInstruction::CallFromRawEthereumTx {
            collateral_pool_index,
            from: self.from,
            signature: self.signature,
            message: self.message.clone(),
        }
    }
}

fn recover_sender(
    hash: &[u8; 32],
    signature: &[u8; SIGNATURE_LEN],
) -> Result<EtherAddress, EncodingError> {
    let rs = Signature::parse_standard_slice(&signature[..64]).map_err(signature_error)?;
    let recovery_id = RecoveryId::parse(signature[64]).map_err(signature_error)?;
    let key = libsecp256k1::recover(&Message::parse(hash), &rs, &recovery_id)
        .map_err(signature_error)?;
    Ok(address_of(&key))
}

/// Last 20 bytes of the keccak of the uncompressed key without its prefix.
fn address_of(key: &PublicKey) -> EtherAddress {
    let digest = keccak256(&key.serialize()[1..]);
    let mut address = [0u8; ETHER_ADDRESS_LEN];
    address.copy_from_slice(&digest[32 - ETHER_ADDRESS_LEN..]);
    EtherAddress(address)
}

fn append_uint(stream: &mut RlpStream, value: &U256) {
    let bytes = value.to_be_bytes();
    stream.append(&trim_leading_zeros(&bytes).to_vec());
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

fn bytes_at(rlp: &Rlp, index: usize) -> Result<Vec<u8>, EncodingError> {
    let item = rlp.at(index).map_err(rlp_error)?;
    Ok(item.data().map_err(rlp_error)?.to_vec())
}

/// Big-endian integer of at most 32 bytes, left padded.
fn word_at(rlp: &Rlp, index: usize) -> Result<[u8; 32], EncodingError> {
    let bytes = bytes_at(rlp, index)?;
    if bytes.len() > 32 {
        return Err(EncodingError::InvalidRlp(format!(
            "field {index} is wider than 32 bytes"
        )));
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

fn rlp_error(err: rlp::DecoderError) -> EncodingError {
    EncodingError::InvalidRlp(format!("{err:?}"))
}

fn signature_error(err: libsecp256k1::Error) -> EncodingError {
    EncodingError::InvalidSignature(format!("{err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [0x46; 32];
    const MESSAGE: &str =
        "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080";
    const RAW: &str = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";
    const SENDER: &str = "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f";

    fn transfer() -> EthTransaction {
        EthTransaction {
            nonce: 9,
            gas_price: U256::new(20_000_000_000),
            gas_limit: 21_000,
            to: Some(EtherAddress([0x35; 20])),
            value: U256::new(1_000_000_000_000_000_000),
            data: Vec::new(),
            chain_id: 1,
        }
    }

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn message_embeds_chain_id() {
        let tx = transfer();
        assert_eq!(hex::encode(tx.message()), MESSAGE);
        assert_eq!(
            hex::encode(tx.hash()),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let signed = transfer().sign(&SECRET).unwrap();
        assert_eq!(signed.from.to_string(), SENDER);
        assert_eq!(signed.v(), 37);
        assert_eq!(
            hex::encode(&signed.signature[..32]),
            "28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276"
        );
        assert_eq!(signed.signature[64], 0);
        assert_eq!(hex::encode(signed.raw()), RAW);
    }

    #[test]
    fn raw_transaction_recovers_sender() {
        let raw = hex::decode(RAW).unwrap();
        let signed = SignedEthTransaction::from_raw(&raw).unwrap();
        assert_eq!(signed.transaction, transfer());
        assert_eq!(signed.from.to_string(), SENDER);
        assert_eq!(hex::encode(&signed.message), MESSAGE);
        assert_eq!(signed, transfer().sign(&SECRET).unwrap());
    }

    #[test]
    fn call_carries_the_triple() {
        let signed = transfer().sign(&SECRET).unwrap();
        let data = signed.call(4).pack().unwrap();
        assert_eq!(data[0], 0x05);
        assert_eq!(&data[1..5], &4u32.to_le_bytes());
        assert_eq!(&data[5..25], signed.from.as_ref());
        assert_eq!(&data[25..90], &signed.signature);
        assert_eq!(hex::encode(&data[90..]), MESSAGE);
    }

    #[test]
    fn deployment_has_empty_recipient() {
        let deploy = EthTransaction {
            to: None,
            data: vec![0x60, 0x80],
            ..transfer()
        };
        let signed = deploy.clone().sign(&SECRET).unwrap();
        let decoded = SignedEthTransaction::from_raw(&signed.raw()).unwrap();
        assert_eq!(decoded.transaction, deploy);
        assert_eq!(decoded.from, signed.from);
    }

    #[test]
    fn malformed_transactions_are_refused() {
        let mut stream = RlpStream::new_list(3);
        stream.append(&1u64).append(&2u64).append(&3u64);
        assert!(matches!(
            SignedEthTransaction::from_raw(&stream.out()),
            Err(EncodingError::InvalidRlp(_))
        ));

        let mut pre_eip155 = transfer().sign(&SECRET).unwrap();
        pre_eip155.transaction.chain_id = 0;
        let mut stream = RlpStream::new_list(FIELDS);
        pre_eip155.transaction.append_fields(&mut stream);
        stream.append(&27u64);
        stream.append(&pre_eip155.signature[..32].to_vec());
        stream.append(&pre_eip155.signature[32..64].to_vec());
        assert!(matches!(
            SignedEthTransaction::from_raw(&stream.out()),
            Err(EncodingError::InvalidSignature(_))
        ));

        assert!(matches!(
            transfer().sign(&[0; 32]),
            Err(EncodingError::InvalidSignature(_))
        ));
    }
}
