//! Instructions for the non-loader programs a loader submission depends on.

use instruction::{AccountMeta, Instruction};
use pubkey::Pubkey;
use solana_system_interface::instruction as sysinstruction;

use crate::ether::ETHER_ADDRESS_LEN;
use crate::pack::{put_le, to_u16};
use crate::{
    EncodingError, COMPUTE_BUDGET_PROGRAM_ID, SECP256K1_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

const REQUEST_HEAP_FRAME: u8 = 0x01;
const REQUEST_UNITS: u8 = 0x02;
const SPL_APPROVE: u8 = 0x04;

/// # Secp256k1 Instruction Data
///
/// Offsets table for the signature-verification program. The checked
/// instruction at `check_index` carries `from(20) || signature(65) || message`
/// starting at `data_start`.
pub fn secp256k1_instruction_data(
    check_index: u8,
    msg_len: usize,
    data_start: usize,
) -> Result<Vec<u8>, EncodingError> {
    let eth_offset = to_u16("eth_address_offset", data_start)?;
    let sig_offset = to_u16("signature_offset", data_start + ETHER_ADDRESS_LEN)?;
    let msg_offset = to_u16("message_data_offset", data_start + ETHER_ADDRESS_LEN + 65)?;
    let msg_len = to_u16("message_data_size", msg_len)?;

    let mut out = vec![1];
    out.extend_from_slice(&sig_offset.to_le_bytes());
    out.push(check_index);
    out.extend_from_slice(&eth_offset.to_le_bytes());
    out.push(check_index);
    out.extend_from_slice(&msg_offset.to_le_bytes());
    out.extend_from_slice(&msg_len.to_le_bytes());
    out.push(check_index);
    Ok(out)
}

pub fn secp256k1_instruction(
    check_index: u8,
    msg_len: usize,
    data_start: usize,
) -> Result<Instruction, EncodingError> {
    Ok(Instruction {
        program_id: SECP256K1_PROGRAM_ID,
        accounts: vec![],
        data: secp256k1_instruction_data(check_index, msg_len, data_start)?,
    })
}

pub fn request_units(units: u32) -> Instruction {
    let mut data = vec![REQUEST_UNITS];
    data.extend_from_slice(&units.to_le_bytes());
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: vec![],
        data,
    }
}

pub fn request_heap_frame(bytes: u32) -> Instruction {
    let mut data = vec![REQUEST_HEAP_FRAME];
    data.extend_from_slice(&bytes.to_le_bytes());
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: vec![],
        data,
    }
}

/// SPL token `Approve`: lets `delegate` move up to `amount` from `source`.
pub fn spl_approve(
    source: &Pubkey,
    delegate: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<Instruction, EncodingError> {
    let mut data = vec![SPL_APPROVE];
    put_le(&mut data, "amount", amount as u128, 8)?;
    Ok(Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*delegate, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data,
    })
}

/// System `CreateAccountWithSeed` for an account owned by `owner`.
pub fn create_account_with_seed(
    payer: &Pubkey,
    base: &Pubkey,
    seed: &str,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Result<Instruction, EncodingError> {
    let address = crate::address::derive_with_seed(base, seed, owner)?;
    Ok(sysinstruction::create_account_with_seed(
        payer, &address, base, seed, lamports, space, owner,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secp256k1_offsets_follow_data_start() {
        let data = secp256k1_instruction_data(1, 300, 5).unwrap();
        assert_eq!(
            data,
            vec![
                1, // count
                25, 0, // signature offset
                1, // index
                5, 0, // eth address offset
                1, // index
                90, 0, // message offset
                0x2c, 0x01, // message length
                1, // index
            ]
        );
    }

    #[test]
    fn secp256k1_offsets_are_range_checked() {
        assert!(secp256k1_instruction_data(0, 70_000, 5).is_err());
        assert_eq!(
            secp256k1_instruction_data(0, 10, 65_500).unwrap_err(),
            EncodingError::Overflow {
                field: "message_data_offset",
                value: 65_585,
                width: 2
            }
        );
        let ix = secp256k1_instruction(0, 10, 5).unwrap();
        assert_eq!(ix.program_id, SECP256K1_PROGRAM_ID);
        assert!(ix.accounts.is_empty());
    }

    #[test]
    fn compute_budget_layout() {
        assert_eq!(request_units(500_000).data, vec![0x02, 0x20, 0xa1, 0x07, 0x00]);
        assert_eq!(request_heap_frame(256 * 1024).data, vec![0x01, 0, 0, 4, 0]);
    }

    #[test]
    fn approve_layout() {
        let source = Pubkey::new_from_array([1; 32]);
        let delegate = Pubkey::new_from_array([2; 32]);
        let owner = Pubkey::new_from_array([3; 32]);
        let ix = spl_approve(&source, &delegate, &owner, 10).unwrap();
        assert_eq!(ix.program_id, TOKEN_PROGRAM_ID);
        assert_eq!(ix.data, vec![4, 10, 0, 0, 0, 0, 0, 0, 0]);
        assert!(ix.accounts[0].is_writable);
        assert!(ix.accounts[2].is_signer);
    }

    #[test]
    fn create_with_seed_targets_derived_address() {
        let payer = Pubkey::new_from_array([1; 32]);
        let owner = Pubkey::new_from_array([5; 32]);
        let ix = create_account_with_seed(&payer, &payer, "holder", 10, 128, &owner).unwrap();
        let expected = crate::address::derive_with_seed(&payer, "holder", &owner).unwrap();
        assert_eq!(ix.program_id, crate::SYSTEM_PROGRAM_ID);
        assert_eq!(ix.accounts[1].pubkey, expected);
    }
}
