use common::config::ConnectionSettings;
use common::types::Commitment;
use hash::Hash;
use pubkey::Pubkey;
use signature::Signature;
use transaction::Transaction;

use crate::confirmation::Confirmation;
use crate::error::{HarnessError, Result};
use crate::extractor::*;
use crate::http::HttpTransport;
use crate::payload;
use crate::transport::RpcTransport;

/// # Ledger
///
/// Read-only queries against the node, plus sending signed transactions for
/// the confirmation engine. Nothing here retries.
pub struct Ledger<T> {
    transport: T,
    commitment: Commitment,
}

impl Ledger<HttpTransport> {
    pub fn connect(settings: &ConnectionSettings) -> Self {
        let transport = HttpTransport::new(settings.solana_url.clone());
        Self::new(transport, settings.commitment)
    }
}

impl<T: RpcTransport> Ledger<T> {
    pub fn new(transport: T, commitment: Commitment) -> Self {
        Self {
            transport,
            commitment,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        let value = self
            .transport
            .call(payload::balance(address, self.commitment))
            .await?;
        balance_extractor(value)
    }

    /// # Get Account Data
    ///
    /// Fetches the account bytes, failing with [`HarnessError::AccountNotFound`]
    /// when the account is absent and [`HarnessError::AccountTooSmall`] when it
    /// holds fewer than `expected_min_len` bytes.
    pub async fn get_account_data(&self, address: &Pubkey, expected_min_len: usize) -> Result<Vec<u8>> {
        let value = self
            .transport
            .call(payload::account_info(address, self.commitment))
            .await?;
        let data = account_extractor(value)?.ok_or(HarnessError::AccountNotFound(*address))?;
        if data.len() < expected_min_len {
            return Err(HarnessError::AccountTooSmall {
                address: *address,
                actual: data.len(),
                expected: expected_min_len,
            });
        }
        Ok(data)
    }

    pub async fn get_slot(&self) -> Result<u64> {
        let value = self.transport.call(payload::slot(self.commitment)).await?;
        u64_extractor(value)
    }

    pub async fn get_block_hash(&self, slot: u64) -> Result<Hash> {
        let value = self
            .transport
            .call(payload::block(slot, self.commitment))
            .await?;
        block_hash_extractor(value)
    }

    pub async fn get_latest_blockhash(&self) -> Result<Hash> {
        self.transport
            .call(payload::blockhash(self.commitment))
            .await
            .inspect_err(|err| tracing::error!(%err, "error fetching blockhash"))
            .and_then(blockhash_extractor)
    }

    pub async fn get_minimum_balance_for_rent_exemption(&self, len: usize) -> Result<u64> {
        let value = self.transport.call(payload::rent_exemption(len)).await?;
        u64_extractor(value)
    }

    /// All accounts owned by `owner` with their data.
    pub async fn list_program_accounts(&self, owner: &Pubkey) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let value = self
            .transport
            .call(payload::program_accounts(owner, self.commitment))
            .await?;
        program_accounts_extractor(value)
    }

    /// Recorded outcome of a transaction, `None` while the ledger does not know it.
    pub async fn get_transaction(&self, signature: &Signature) -> Result<Option<Confirmation>> {
        let value = self
            .transport
            .call(payload::transaction_status(signature, self.commitment))
            .await?;
        transaction_extractor(*signature, value)
    }

    pub async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        tracing::info!(%address, lamports, "requesting airdrop");
        let value = self.transport.call(payload::airdrop(address, lamports)).await?;
        signature_extractor(value)
    }

    /// Sends a signed transaction with preflight. A simulation failure comes
    /// back as [`HarnessError::Rpc`].
    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let call = payload::transaction(transaction, self.commitment)?;
        let value = self.transport.call(call).await?;
        signature_extractor(value)
    }
}
