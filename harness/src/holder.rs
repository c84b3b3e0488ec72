//! Staging of signed Ethereum transactions in holder accounts.

use instruction::Instruction;
use interface::builders::write_holder;
use interface::pack::put_len;
use interface::EncodingError;
use keypair::Keypair;
use pubkey::Pubkey;
use signer::Signer;

use crate::confirmation::{Confirmation, SubmissionResult, Submitter};
use crate::envelope::EnvelopeBuilder;
use crate::error::{HarnessError, Result};
use crate::transport::RpcTransport;

/// Bytes written by one `WriteHolder` instruction.
pub const HOLDER_CHUNK_SIZE: usize = 1000;

/// Holder contents: `signature || len(message) as u64 LE || message`.
pub fn holder_payload(signature: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(signature.len() + 8 + message.len());
    payload.extend_from_slice(signature);
    put_len(&mut payload, "message_len", message.len(), 8)?;
    payload.extend_from_slice(message);
    Ok(payload)
}

/// One `WriteHolder` instruction per `chunk_size` bytes of `payload`, with
/// increasing offsets.
pub fn write_instructions(
    loader: &Pubkey,
    holder: &Pubkey,
    operator: &Pubkey,
    nonce: u64,
    payload: &[u8],
    chunk_size: usize,
) -> Result<Vec<Instruction>> {
    let chunk_size = chunk_size.max(1);
    payload
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, chunk)| -> Result<Instruction> {
            let offset = index * chunk_size;
            let offset = u32::try_from(offset).map_err(|_| EncodingError::Overflow {
                field: "offset",
                value: offset as u128,
                width: 4,
            })?;
            Ok(write_holder(loader, holder, operator, nonce, offset, chunk.to_vec())?)
        })
        .collect()
}

/// # Stage Transaction
///
/// Writes the holder payload chunk by chunk without waiting between sends,
/// then confirms every chunk. A rejected or unconfirmed chunk is an error.
pub async fn stage_transaction<T: RpcTransport>(
    submitter: &Submitter<'_, T>,
    operator: &Keypair,
    loader: &Pubkey,
    holder: &Pubkey,
    nonce: u64,
    signature: &[u8],
    message: &[u8],
) -> Result<Vec<Confirmation>> {
    let payload = holder_payload(signature, message)?;
    let instructions = write_instructions(
        loader,
        holder,
        &operator.pubkey(),
        nonce,
        &payload,
        HOLDER_CHUNK_SIZE,
    )?;

    let mut signatures = Vec::with_capacity(instructions.len());
    for instruction in instructions {
        let envelope = EnvelopeBuilder::new(operator.pubkey())
            .add(instruction)
            .build()?;
        match submitter.send(&envelope, &[operator]).await? {
            Ok(signature) => signatures.push(signature),
            Err(rejection) => return Err(HarnessError::Rejected(Box::new(rejection))),
        }
    }
    tracing::info!(%holder, chunks = signatures.len(), bytes = payload.len(), "holder chunks sent");

    submitter
        .confirm_all(&signatures)
        .await?
        .into_iter()
        .map(SubmissionResult::into_confirmation)
        .collect()
}
