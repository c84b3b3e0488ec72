use instruction::{AccountMeta, Instruction};
use pubkey::Pubkey;

use crate::ether::ETHER_ADDRESS_LEN;
use crate::pack::{put_le, put_len, Reader};
use crate::{EncodingError, EtherAddress};

pub const SIGNATURE_LEN: usize = 65;

pub mod opcode {
    pub const CALL_FROM_RAW_ETHEREUM_TX: u8 = 0x05;
    pub const REFUND: u8 = 0x10;
    pub const RESIZE_STORAGE: u8 = 0x11;
    pub const WRITE_HOLDER: u8 = 0x12;
    pub const DEPOSIT: u8 = 0x19;
    pub const CREATE_HOLDER: u8 = 0x24;
    pub const KECCAK_SYSCALL: u8 = 0xb1;
    pub const SHA3_LIBRARY: u8 = 0xb2;
    pub const GET_BLOCK_HASHES: u8 = 0xf0;
}

/// # Loader Instructions
///
/// Every instruction kind the harness sends to the loader. The opcode is the
/// first byte of the data, fixed-width integers are little endian and
/// variable-length fields come after all fixed ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoaderInstruction {
    /// ## Call From Raw Ethereum Transaction
    ///
    /// Executes a signed Ethereum transaction whose signature is checked by a
    /// preceding secp256k1 instruction. The collateral pool receives the fee.
    CallFromRawEthereumTx {
        collateral_pool_index: u32,
        from: EtherAddress,
        signature: [u8; SIGNATURE_LEN],
        message: Vec<u8>,
    },
    /// ## Refund
    ///
    /// Deletes a seed-derived account and returns its lamports to the creator.
    Refund { seed: String },
    /// ## Resize Storage
    ///
    /// Moves contract storage into a larger seed-derived code account.
    ResizeStorage { seed: String },
    /// ## Write Holder
    ///
    /// Writes a chunk of transaction bytes into a holder account at `offset`.
    WriteHolder { nonce: u64, offset: u32, data: Vec<u8> },
    /// ## Deposit
    ///
    /// Moves approved tokens from the source token account into the pool and
    /// credits the ether account. Operands are carried by the accounts.
    Deposit,
    /// ## Create Holder
    CreateHolder { seed: String },
    /// ## Keccak Syscall
    KeccakSyscall,
    /// ## SHA3 Library
    Sha3Library,
    /// ## Get Block Hashes
    ///
    /// Logs recent block hashes as seen by the loader.
    GetBlockHashes,
}

impl LoaderInstruction {
    pub fn opcode(&self) -> u8 {
        match self {
            Self::CallFromRawEthereumTx { .. } => opcode::CALL_FROM_RAW_ETHEREUM_TX,
            Self::Refund { .. } => opcode::REFUND,
            Self::ResizeStorage { .. } => opcode::RESIZE_STORAGE,
            Self::WriteHolder { .. } => opcode::WRITE_HOLDER,
            Self::Deposit => opcode::DEPOSIT,
            Self::CreateHolder { .. } => opcode::CREATE_HOLDER,
            Self::KeccakSyscall => opcode::KECCAK_SYSCALL,
            Self::Sha3Library => opcode::SHA3_LIBRARY,
            Self::GetBlockHashes => opcode::GET_BLOCK_HASHES,
        }
    }

    /// # Pack
    ///
    /// Serializes the instruction into loader wire format.
    pub fn pack(&self) -> Result<Vec<u8>, EncodingError> {
        let mut out = vec![self.opcode()];
        match self {
            Self::CallFromRawEthereumTx {
                collateral_pool_index,
                from,
                signature,
                message,
            } => {
                put_le(&mut out, "collateral_pool_index", *collateral_pool_index as u128, 4)?;
                out.extend_from_slice(from.as_ref());
                out.extend_from_slice(signature);
                out.extend_from_slice(message);
            }
            Self::Refund { seed } | Self::ResizeStorage { seed } => {
                out.extend_from_slice(seed.as_bytes());
            }
            Self::WriteHolder {
                nonce,
                offset,
                data,
            } => {
                put_le(&mut out, "nonce", *nonce as u128, 8)?;
                put_le(&mut out, "offset", *offset as u128, 4)?;
                put_len(&mut out, "data_len", data.len(), 8)?;
                out.extend_from_slice(data);
            }
            Self::CreateHolder { seed } => {
                put_len(&mut out, "seed_len", seed.len(), 8)?;
                out.extend_from_slice(seed.as_bytes());
            }
            Self::Deposit | Self::KeccakSyscall | Self::Sha3Library | Self::GetBlockHashes => {}
        }
        Ok(out)
    }

    /// # Unpack
    ///
    /// Decodes loader wire format produced by [`LoaderInstruction::pack`].
    pub fn unpack(data: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = Reader::new(data);
        let tag = reader.u8("opcode")?;
        let ix = match tag {
            opcode::CALL_FROM_RAW_ETHEREUM_TX => Self::CallFromRawEthereumTx {
                collateral_pool_index: reader.u32("collateral_pool_index")?,
                from: EtherAddress(reader.array::<ETHER_ADDRESS_LEN>("from")?),
                signature: reader.array::<SIGNATURE_LEN>("signature")?,
                message: reader.rest().to_vec(),
            },
            opcode::REFUND => Self::Refund {
                seed: utf8(reader.rest(), "seed")?,
            },
            opcode::RESIZE_STORAGE => Self::ResizeStorage {
                seed: utf8(reader.rest(), "seed")?,
            },
            opcode::WRITE_HOLDER => Self::WriteHolder {
                nonce: reader.u64("nonce")?,
                offset: reader.u32("offset")?,
                data: reader.sized("data")?.to_vec(),
            },
            opcode::DEPOSIT => Self::Deposit,
            opcode::CREATE_HOLDER => Self::CreateHolder {
                seed: utf8(reader.sized("seed")?, "seed")?,
            },
            opcode::KECCAK_SYSCALL => Self::KeccakSyscall,
            opcode::SHA3_LIBRARY => Self::Sha3Library,
            opcode::GET_BLOCK_HASHES => Self::GetBlockHashes,
            unknown => return Err(EncodingError::UnknownOpcode(unknown)),
        };
        Ok(ix)
    }

    /// Wraps the packed data into a ledger instruction addressed to `loader`.
    pub fn into_instruction(
        self,
        loader: Pubkey,
        accounts: Vec<AccountMeta>,
    ) -> Result<Instruction, EncodingError> {
        Ok(Instruction {
            program_id: loader,
            accounts,
            data: self.pack()?,
        })
    }
}

fn utf8(bytes: &[u8], field: &'static str) -> Result<String, EncodingError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| EncodingError::InvalidUtf8 { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> LoaderInstruction {
        LoaderInstruction::CallFromRawEthereumTx {
            collateral_pool_index: 2,
            from: EtherAddress([0x11; 20]),
            signature: [0x22; SIGNATURE_LEN],
            message: vec![0xf8, 0x6b, 0x80],
        }
    }

    #[test]
    fn opcode_is_first_byte() {
        let all = [
            call(),
            LoaderInstruction::Refund { seed: "s".into() },
            LoaderInstruction::ResizeStorage { seed: "s".into() },
            LoaderInstruction::WriteHolder {
                nonce: 0,
                offset: 0,
                data: vec![],
            },
            LoaderInstruction::Deposit,
            LoaderInstruction::CreateHolder { seed: "s".into() },
            LoaderInstruction::KeccakSyscall,
            LoaderInstruction::Sha3Library,
            LoaderInstruction::GetBlockHashes,
        ];
        for ix in all {
            assert_eq!(ix.pack().unwrap()[0], ix.opcode());
        }
    }

    #[test]
    fn write_holder_layout() {
        let ix = LoaderInstruction::WriteHolder {
            nonce: 0x0102,
            offset: 1000,
            data: vec![0xaa, 0xbb, 0xcc],
        };
        let data = ix.pack().unwrap();
        assert_eq!(data.len(), 1 + 8 + 4 + 8 + 3);
        assert_eq!(data[0], 0x12);
        assert_eq!(&data[1..9], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&data[9..13], &1000u32.to_le_bytes());
        assert_eq!(&data[13..21], &3u64.to_le_bytes());
        assert_eq!(&data[21..], &[0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn write_holder_hello() {
        let ix = LoaderInstruction::WriteHolder {
            nonce: 0,
            offset: 0,
            data: b"hello".to_vec(),
        };
        let data = ix.pack().unwrap();
        assert_eq!(data[0], 0x12);
        assert_eq!(&data[1..13], &[0; 12]);
        assert_eq!(&data[13..21], &5u64.to_le_bytes());
        assert_eq!(&data[21..], b"hello");
        assert_eq!(LoaderInstruction::unpack(&data).unwrap(), ix);
    }

    #[test]
    fn call_from_raw_tx_layout() {
        let data = call().pack().unwrap();
        assert_eq!(data[0], 0x05);
        assert_eq!(&data[1..5], &2u32.to_le_bytes());
        assert_eq!(&data[5..25], &[0x11; 20]);
        assert_eq!(&data[25..90], &[0x22; 65]);
        assert_eq!(&data[90..], &[0xf8, 0x6b, 0x80]);
    }

    #[test]
    fn operand_free_kinds_are_single_byte() {
        assert_eq!(LoaderInstruction::KeccakSyscall.pack().unwrap(), vec![0xb1]);
        assert_eq!(LoaderInstruction::Sha3Library.pack().unwrap(), vec![0xb2]);
        assert_eq!(LoaderInstruction::GetBlockHashes.pack().unwrap(), vec![0xf0]);
        assert_eq!(LoaderInstruction::Deposit.pack().unwrap(), vec![0x19]);
    }

    #[test]
    fn seeds_follow_the_opcode() {
        let refund = LoaderInstruction::Refund {
            seed: "abcd".into(),
        };
        assert_eq!(refund.pack().unwrap(), b"\x10abcd");
        let holder = LoaderInstruction::CreateHolder {
            seed: "xy".into(),
        };
        assert_eq!(
            holder.pack().unwrap(),
            [0x24, 2, 0, 0, 0, 0, 0, 0, 0, b'x', b'y']
        );
    }

    #[test]
    fn unpack_inverts_pack() {
        let data = call().pack().unwrap();
        assert_eq!(LoaderInstruction::unpack(&data).unwrap(), call());

        let ix = LoaderInstruction::WriteHolder {
            nonce: 9,
            offset: 4000,
            data: vec![1, 2, 3, 4],
        };
        assert_eq!(LoaderInstruction::unpack(&ix.pack().unwrap()).unwrap(), ix);
    }

    #[test]
    fn unpack_rejects_unknown_and_short_data() {
        assert_eq!(
            LoaderInstruction::unpack(&[0x7f]),
            Err(EncodingError::UnknownOpcode(0x7f))
        );
        assert_eq!(
            LoaderInstruction::unpack(&[]),
            Err(EncodingError::Truncated { field: "opcode" })
        );
        let mut data = call().pack().unwrap();
        data.truncate(40);
        assert_eq!(
            LoaderInstruction::unpack(&data),
            Err(EncodingError::Truncated { field: "signature" })
        );
        let ix = LoaderInstruction::WriteHolder {
            nonce: 1,
            offset: 0,
            data: vec![0; 10],
        };
        let mut data = ix.pack().unwrap();
        data.pop();
        assert_eq!(
            LoaderInstruction::unpack(&data),
            Err(EncodingError::Truncated { field: "data" })
        );
    }

    #[test]
    fn instruction_targets_loader() {
        let loader = Pubkey::new_from_array([4; 32]);
        let ix = LoaderInstruction::KeccakSyscall
            .into_instruction(loader, vec![AccountMeta::new_readonly(loader, false)])
            .unwrap();
        assert_eq!(ix.program_id, loader);
        assert_eq!(ix.data, vec![0xb1]);
        assert_eq!(ix.accounts.len(), 1);
    }
}
