//! Loader instructions paired with the positional account lists the loader
//! expects. Order is significant and reproduced exactly.

use instruction::{AccountMeta, Instruction};
use pubkey::Pubkey;

use crate::address::deposit_authority;
use crate::codec::SIGNATURE_LEN;
use crate::{
    EncodingError, EtherAddress, LoaderInstruction, SYSTEM_PROGRAM_ID, SYSVAR_INSTRUCTIONS_ID,
    SYSVAR_RECENT_BLOCKHASHES_ID, TOKEN_PROGRAM_ID,
};

/// Accounts touched by a call from a raw Ethereum transaction.
#[derive(Clone, Debug)]
pub struct CallAccounts {
    pub operator: Pubkey,
    pub collateral_pool: Pubkey,
    pub caller: Pubkey,
    pub contract: Pubkey,
    /// Absent for contracts without a separate code account.
    pub code: Option<Pubkey>,
    /// Additional accounts the called contract reaches, appended before the
    /// token program.
    pub extra: Vec<AccountMeta>,
}

pub fn call_from_raw_ethereum_tx(
    loader: &Pubkey,
    accounts: &CallAccounts,
    collateral_pool_index: u32,
    from: EtherAddress,
    signature: [u8; SIGNATURE_LEN],
    message: Vec<u8>,
) -> Result<Instruction, EncodingError> {
    let mut metas = vec![
        AccountMeta::new_readonly(SYSVAR_INSTRUCTIONS_ID, false),
        AccountMeta::new(accounts.operator, true),
        AccountMeta::new(accounts.collateral_pool, false),
        AccountMeta::new(accounts.caller, false),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        AccountMeta::new_readonly(*loader, false),
        AccountMeta::new(accounts.contract, false),
    ];
    metas.extend(accounts.code.map(|code| AccountMeta::new(code, false)));
    metas.push(AccountMeta::new(accounts.caller, false));
    metas.extend(accounts.extra.iter().cloned());
    metas.push(AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false));

    LoaderInstruction::CallFromRawEthereumTx {
        collateral_pool_index,
        from,
        signature,
        message,
    }
    .into_instruction(*loader, metas)
}

pub fn write_holder(
    loader: &Pubkey,
    holder: &Pubkey,
    operator: &Pubkey,
    nonce: u64,
    offset: u32,
    data: Vec<u8>,
) -> Result<Instruction, EncodingError> {
    let accounts = vec![
        AccountMeta::new(*holder, false),
        AccountMeta::new_readonly(*operator, true),
    ];
    LoaderInstruction::WriteHolder {
        nonce,
        offset,
        data,
    }
    .into_instruction(*loader, accounts)
}

pub fn create_holder(
    loader: &Pubkey,
    holder: &Pubkey,
    operator: &Pubkey,
    seed: String,
) -> Result<Instruction, EncodingError> {
    let accounts = vec![
        AccountMeta::new(*holder, false),
        AccountMeta::new(*operator, true),
    ];
    LoaderInstruction::CreateHolder { seed }.into_instruction(*loader, accounts)
}

/// Refund of a seed-derived account. The creator only signs when it pays for
/// the call itself.
pub fn refund(
    loader: &Pubkey,
    deleted: &Pubkey,
    creator: &Pubkey,
    creator_signs: bool,
    seed: String,
) -> Result<Instruction, EncodingError> {
    let accounts = vec![
        AccountMeta::new(*deleted, false),
        AccountMeta::new(*creator, creator_signs),
        AccountMeta::new_readonly(*loader, false),
    ];
    LoaderInstruction::Refund { seed }.into_instruction(*loader, accounts)
}

pub fn resize_storage(
    loader: &Pubkey,
    account: &Pubkey,
    code: &Pubkey,
    new_code: &Pubkey,
    operator: &Pubkey,
    seed: String,
) -> Result<Instruction, EncodingError> {
    let accounts = vec![
        AccountMeta::new(*account, false),
        AccountMeta::new(*code, false),
        AccountMeta::new(*new_code, false),
        AccountMeta::new_readonly(*operator, true),
    ];
    LoaderInstruction::ResizeStorage { seed }.into_instruction(*loader, accounts)
}

/// Deposit of tokens already approved to the deposit authority.
pub fn deposit(
    loader: &Pubkey,
    source: &Pubkey,
    pool: &Pubkey,
    ether_account: &Pubkey,
) -> Result<Instruction, EncodingError> {
    let (authority, _) = deposit_authority(loader);
    let accounts = vec![
        AccountMeta::new(*source, false),
        AccountMeta::new(*pool, false),
        AccountMeta::new(*ether_account, false),
        AccountMeta::new_readonly(authority, false),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
    ];
    LoaderInstruction::Deposit.into_instruction(*loader, accounts)
}

pub fn keccak_syscall(loader: &Pubkey) -> Result<Instruction, EncodingError> {
    LoaderInstruction::KeccakSyscall
        .into_instruction(*loader, vec![AccountMeta::new_readonly(*loader, false)])
}

pub fn sha3_library(loader: &Pubkey) -> Result<Instruction, EncodingError> {
    LoaderInstruction::Sha3Library
        .into_instruction(*loader, vec![AccountMeta::new_readonly(*loader, false)])
}

pub fn get_block_hashes(loader: &Pubkey) -> Result<Instruction, EncodingError> {
    let accounts = vec![AccountMeta::new_readonly(SYSVAR_RECENT_BLOCKHASHES_ID, false)];
    LoaderInstruction::GetBlockHashes.into_instruction(*loader, accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    fn flags(ix: &Instruction) -> Vec<(Pubkey, bool, bool)> {
        ix.accounts
            .iter()
            .map(|m| (m.pubkey, m.is_signer, m.is_writable))
            .collect()
    }

    #[test]
    fn write_holder_accounts() {
        let ix = write_holder(&key(1), &key(2), &key(3), 7, 0, vec![1]).unwrap();
        assert_eq!(ix.program_id, key(1));
        assert_eq!(flags(&ix), vec![(key(2), false, true), (key(3), true, false)]);
    }

    #[test]
    fn refund_creator_signature_is_optional() {
        let ix = refund(&key(1), &key(2), &key(3), false, "seed".into()).unwrap();
        assert_eq!(
            flags(&ix),
            vec![
                (key(2), false, true),
                (key(3), false, true),
                (key(1), false, false)
            ]
        );
        let ix = refund(&key(1), &key(2), &key(3), true, "seed".into()).unwrap();
        assert!(ix.accounts[1].is_signer);
    }

    #[test]
    fn resize_storage_accounts() {
        let ix = resize_storage(&key(1), &key(2), &key(3), &key(4), &key(5), "s".into()).unwrap();
        assert_eq!(
            flags(&ix),
            vec![
                (key(2), false, true),
                (key(3), false, true),
                (key(4), false, true),
                (key(5), true, false)
            ]
        );
    }

    #[test]
    fn call_accounts_keep_positional_order() {
        let accounts = CallAccounts {
            operator: key(10),
            collateral_pool: key(11),
            caller: key(12),
            contract: key(13),
            code: Some(key(14)),
            extra: vec![AccountMeta::new_readonly(key(15), false)],
        };
        let ix = call_from_raw_ethereum_tx(&key(1), &accounts, 0, EtherAddress::default(), [0; 65], vec![])
            .unwrap();
        assert_eq!(
            flags(&ix),
            vec![
                (SYSVAR_INSTRUCTIONS_ID, false, false),
                (key(10), true, true),
                (key(11), false, true),
                (key(12), false, true),
                (SYSTEM_PROGRAM_ID, false, false),
                (key(1), false, false),
                (key(13), false, true),
                (key(14), false, true),
                (key(12), false, true),
                (key(15), false, false),
                (TOKEN_PROGRAM_ID, false, false),
            ]
        );

        let without_code = CallAccounts {
            code: None,
            extra: vec![],
            ..accounts
        };
        let ix = call_from_raw_ethereum_tx(&key(1), &without_code, 0, EtherAddress::default(), [0; 65], vec![])
            .unwrap();
        assert_eq!(ix.accounts.len(), 9);
    }

    #[test]
    fn deposit_accounts() {
        let ix = deposit(&key(1), &key(2), &key(3), &key(4)).unwrap();
        let (authority, _) = deposit_authority(&key(1));
        assert_eq!(ix.data, vec![0x19]);
        assert_eq!(
            flags(&ix),
            vec![
                (key(2), false, true),
                (key(3), false, true),
                (key(4), false, true),
                (authority, false, false),
                (TOKEN_PROGRAM_ID, false, false),
            ]
        );
    }

    #[test]
    fn syscalls_reference_the_loader() {
        for ix in [keccak_syscall(&key(1)), sha3_library(&key(1))] {
            let ix = ix.unwrap();
            assert_eq!(flags(&ix), vec![(key(1), false, false)]);
        }
        let ix = get_block_hashes(&key(1)).unwrap();
        assert_eq!(ix.data, vec![0xf0]);
        assert_eq!(ix.accounts[0].pubkey, SYSVAR_RECENT_BLOCKHASHES_ID);
    }
}
