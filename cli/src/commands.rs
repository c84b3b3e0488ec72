use std::fmt;
use std::path::{Path, PathBuf};

use common::config::Config;
use common::types::HarnessResult;
use harness::holder::stage_transaction;
use harness::{ConfirmationPolicy, EnvelopeBuilder, HarnessError, HttpTransport, Ledger, Submitter};
use interface::account::EtherAccountData;
use interface::address::{associated_token_address, deposit_authority, ether_to_program, holder_address};
use interface::{builders, programs, EtherAddress, SignedEthTransaction};
use keypair::Keypair;
use pubkey::Pubkey;
use signer::{EncodableKey, Signer};

/// Everything a command needs, built once from the resolved configuration.
pub struct Context {
    pub config: Config,
    pub loader: Pubkey,
    pub ledger: Ledger<HttpTransport>,
}

impl Context {
    pub fn new(config: Config, loader: Pubkey) -> Self {
        let ledger = Ledger::connect(&config.connection);
        Self {
            config,
            loader,
            ledger,
        }
    }

    fn payer(&self) -> HarnessResult<Keypair> {
        read_keypair(&self.config.paths.keypair)
    }

    fn submitter(&self) -> Submitter<'_, HttpTransport> {
        Submitter::new(&self.ledger, ConfirmationPolicy::from(&self.config.confirmation))
    }

    fn ether_account(&self, address: &EtherAddress) -> (Pubkey, u8) {
        ether_to_program(address, &self.loader, self.config.loader.account_seed_version)
    }
}

fn read_keypair(path: &Path) -> HarnessResult<Keypair> {
    Keypair::read_from_file(path)
        .map_err(|err| format!("failed to read keypair {}: {err}", path.display()).into())
}

/// # Deposit
///
/// Moves `amount` tokens from the payer's token account into the loader pool,
/// credited to the loader account of `address`.
pub async fn deposit(ctx: &Context, amount: u64, address: EtherAddress) -> HarnessResult<()> {
    let payer = ctx.payer()?;
    let mint = ctx.config.eth_token_mint()?;
    let (authority, _) = deposit_authority(&ctx.loader);
    let source = associated_token_address(&payer.pubkey(), &mint);
    let pool = associated_token_address(&authority, &mint);
    let (ether_account, _) = ctx.ether_account(&address);

    let envelope = EnvelopeBuilder::new(payer.pubkey())
        .add(programs::spl_approve(&source, &authority, &payer.pubkey(), amount)?)
        .add(builders::deposit(&ctx.loader, &source, &pool, &ether_account)?)
        .build()?;
    tracing::info!(%address, %ether_account, amount, "depositing");
    let confirmation = ctx.submitter().submit_confirmed(&envelope, &[&payer]).await?;
    println!("{}", confirmation.signature);
    Ok(())
}

pub async fn get_ether_account_data(ctx: &Context, address: EtherAddress) -> HarnessResult<()> {
    let (solana_address, _) = ctx.ether_account(&address);
    let data = match ctx.ledger.get_account_data(&solana_address, EtherAccountData::SIZE).await {
        Ok(data) => data,
        Err(HarnessError::AccountNotFound(_)) => {
            println!("Account not found {address}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let account = EtherAccountData::unpack(&data)?;
    let report = AccountReport {
        address: &address,
        solana_address: &solana_address,
        account: &account,
    };
    print!("{report}");
    Ok(())
}

/// Contract code is dumped in hex, this many bytes per line.
const CODE_LINE_BYTES: usize = 80;

struct AccountReport<'a> {
    address: &'a EtherAddress,
    solana_address: &'a Pubkey,
    account: &'a EtherAccountData,
}

impl fmt::Display for AccountReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let account = self.account;
        writeln!(f, "Ethereum address: {}", self.address)?;
        writeln!(f, "Solana address: {}", self.solana_address)?;
        writeln!(f, "Account fields")?;
        writeln!(f, "    address: {}", account.address)?;
        writeln!(f, "    bump_seed: {}", account.bump_seed)?;
        writeln!(f, "    trx_count: {}", account.trx_count)?;
        writeln!(f, "    rw_blocked: {}", account.rw_blocked)?;
        writeln!(f, "    balance: {}", account.balance)?;
        writeln!(f, "    code_size: {}", account.code_size)?;
        if account.code.is_empty() {
            return Ok(());
        }
        writeln!(f, "Contract code")?;
        for line in account.code.chunks(CODE_LINE_BYTES) {
            writeln!(f, "        {}", hex::encode(line))?;
        }
        Ok(())
    }
}

pub fn create_program_address(ctx: &Context, address: EtherAddress) {
    let (solana_address, bump) = ctx.ether_account(&address);
    println!("{solana_address} {bump}");
}

/// # Write Holder
///
/// Stages the raw signed transaction in `file` into a holder account and
/// prints the signature of every chunk. Without an explicit `holder` the
/// operator's holder account for `nonce` is used.
pub async fn write_holder(
    ctx: &Context,
    file: PathBuf,
    holder: Option<Pubkey>,
    nonce: u64,
) -> HarnessResult<()> {
    let raw = read_raw_transaction(&file)?;
    let trx = SignedEthTransaction::from_raw(&raw)?;
    let operator = ctx.payer()?;
    let holder = match holder {
        Some(holder) => holder,
        None => holder_address(&operator.pubkey(), nonce, &ctx.loader)?,
    };
    tracing::info!(from = %trx.from, %holder, nonce, "staging transaction");
    let confirmations = stage_transaction(
        &ctx.submitter(),
        &operator,
        &ctx.loader,
        &holder,
        nonce,
        &trx.signature,
        &trx.message,
    )
    .await?;
    for confirmation in confirmations {
        println!("{}", confirmation.signature);
    }
    Ok(())
}

fn read_raw_transaction(path: &Path) -> HarnessResult<Vec<u8>> {
    let text = std::fs::read_to_string(path)?;
    let text = text.trim();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|err| format!("{} is not hex: {err}", path.display()).into())
}

pub async fn block_hashes(ctx: &Context) -> HarnessResult<()> {
    let payer = ctx.payer()?;
    let envelope = EnvelopeBuilder::new(payer.pubkey())
        .add(builders::get_block_hashes(&ctx.loader)?)
        .build()?;
    let confirmation = ctx.submitter().submit_confirmed(&envelope, &[&payer]).await?;
    for line in &confirmation.logs {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ethnum::U256;

    use super::*;

    fn account(code: Vec<u8>) -> EtherAccountData {
        EtherAccountData {
            tag: 1,
            address: "0x00000000000000000000000000000000000000ff".parse().unwrap(),
            bump_seed: 254,
            trx_count: 3,
            balance: U256::from(1_000_000_000_000_000_000u64),
            generation: 0,
            code_size: code.len() as u32,
            rw_blocked: false,
            code,
        }
    }

    #[test]
    fn account_report_prints_decimal_balance() {
        let account = account(Vec::new());
        let solana = Pubkey::new_unique();
        let rendered = AccountReport {
            address: &account.address,
            solana_address: &solana,
            account: &account,
        }
        .to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Ethereum address: 0x00000000000000000000000000000000000000ff");
        assert_eq!(lines[1], format!("Solana address: {solana}"));
        assert_eq!(lines[2], "Account fields");
        assert!(lines.contains(&"    balance: 1000000000000000000"));
        assert!(lines.contains(&"    bump_seed: 254"));
        assert_eq!(lines.last(), Some(&"    code_size: 0"));
    }

    #[test]
    fn account_report_dumps_code_in_lines() {
        let code: Vec<u8> = (0..=200u8).collect();
        let account = account(code.clone());
        let solana = Pubkey::new_unique();
        let rendered = AccountReport {
            address: &account.address,
            solana_address: &solana,
            account: &account,
        }
        .to_string();
        let dump: Vec<&str> = rendered
            .lines()
            .skip_while(|line| *line != "Contract code")
            .skip(1)
            .collect();
        assert_eq!(dump.len(), 3);
        assert_eq!(dump[0], format!("        {}", hex::encode(&code[..80])));
        assert_eq!(dump[1], format!("        {}", hex::encode(&code[80..160])));
        assert_eq!(dump[2], format!("        {}", hex::encode(&code[160..])));
    }

    #[test]
    fn raw_transaction_file_is_hex() {
        let dir = std::env::temp_dir();
        let prefixed = dir.join("loader-cli-prefixed-trx.hex");
        let bare = dir.join("loader-cli-bare-trx.hex");
        let garbage = dir.join("loader-cli-garbage-trx.hex");
        writeln!(std::fs::File::create(&prefixed).unwrap(), "0xf86c09").unwrap();
        std::fs::write(&bare, "f86c09").unwrap();
        std::fs::write(&garbage, "not hex").unwrap();

        assert_eq!(read_raw_transaction(&prefixed).unwrap(), vec![0xf8, 0x6c, 0x09]);
        assert_eq!(read_raw_transaction(&bare).unwrap(), vec![0xf8, 0x6c, 0x09]);
        assert!(read_raw_transaction(&garbage).is_err());

        for path in [prefixed, bare, garbage] {
            let _ = std::fs::remove_file(path);
        }
    }
}
