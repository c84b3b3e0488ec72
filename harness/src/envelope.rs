use hash::Hash;
use instruction::Instruction;
use keypair::Keypair;
use pubkey::Pubkey;
use transaction::Transaction;

use crate::error::{HarnessError, Result};

/// # Envelope Builder
///
/// Accumulates instructions in call order. Account references are kept as
/// given; nothing is deduplicated across instructions.
pub struct EnvelopeBuilder {
    payer: Pubkey,
    instructions: Vec<Instruction>,
}

impl EnvelopeBuilder {
    pub fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            instructions: Vec::new(),
        }
    }

    pub fn add(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    pub fn extend(mut self, instructions: impl IntoIterator<Item = Instruction>) -> Self {
        self.instructions.extend(instructions);
        self
    }

    pub fn build(self) -> Result<Envelope> {
        if self.instructions.is_empty() {
            return Err(HarnessError::EmptyTransaction);
        }
        Ok(Envelope {
            payer: self.payer,
            instructions: self.instructions,
        })
    }
}

/// # Envelope
///
/// Non-empty, ordered list of instructions with one fee payer, executed
/// atomically by the ledger.
#[derive(Clone, Debug)]
pub struct Envelope {
    payer: Pubkey,
    instructions: Vec<Instruction>,
}

impl Envelope {
    pub fn payer(&self) -> &Pubkey {
        &self.payer
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Signs for `blockhash`. Fails when a required signer is missing or a
    /// given keypair is not part of the transaction.
    pub fn sign(&self, signers: &[&Keypair], blockhash: Hash) -> Result<Transaction> {
        let mut transaction = Transaction::new_with_payer(&self.instructions, Some(&self.payer));
        transaction.try_sign(signers, blockhash)?;
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use instruction::AccountMeta;
    use signer::Signer;

    use super::*;

    fn ix(program: Pubkey, account: Pubkey, data: u8) -> Instruction {
        Instruction {
            program_id: program,
            accounts: vec![AccountMeta::new(account, false)],
            data: vec![data],
        }
    }

    #[test]
    fn empty_envelope_is_rejected() {
        let payer = Pubkey::new_unique();
        assert!(matches!(
            EnvelopeBuilder::new(payer).build(),
            Err(HarnessError::EmptyTransaction)
        ));
    }

    #[test]
    fn instructions_keep_call_order_and_duplicates() {
        let program = Pubkey::new_unique();
        let account = Pubkey::new_unique();
        let envelope = EnvelopeBuilder::new(Pubkey::new_unique())
            .add(ix(program, account, 1))
            .add(ix(program, account, 2))
            .extend([ix(program, account, 3)])
            .build()
            .unwrap();
        let data: Vec<u8> = envelope.instructions().iter().map(|i| i.data[0]).collect();
        assert_eq!(data, vec![1, 2, 3]);
        assert!(envelope
            .instructions()
            .iter()
            .all(|i| i.accounts[0].pubkey == account));
    }

    #[test]
    fn signing_checks_signers() {
        let payer = Keypair::new();
        let stranger = Keypair::new();
        let envelope = EnvelopeBuilder::new(payer.pubkey())
            .add(ix(Pubkey::new_unique(), Pubkey::new_unique(), 0))
            .build()
            .unwrap();
        let blockhash = Hash::new_from_array([1; 32]);

        let transaction = envelope.sign(&[&payer], blockhash).unwrap();
        assert_eq!(transaction.message.recent_blockhash, blockhash);
        assert!(transaction.is_signed());

        assert!(matches!(
            envelope.sign(&[], blockhash),
            Err(HarnessError::Signing(_))
        ));
        assert!(matches!(
            envelope.sign(&[&payer, &stranger], blockhash),
            Err(HarnessError::Signing(_))
        ));
    }
}
