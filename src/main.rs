use clap::Parser;
use miette::{IntoDiagnostic, Result};
use p2p_ledger::application::bank::Bank;
use p2p_ledger::config::LedgerConfig;
use p2p_ledger::infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransferStore};
use p2p_ledger::interfaces::command::{Command, execute};
use p2p_ledger::interfaces::csv::account_writer::AccountWriter;
use p2p_ledger::interfaces::csv::command_reader::CommandReader;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command script, one command per line. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Largest amount a single deposit, withdrawal or transfer may move.
    /// Overrides LEDGER_MAX_AMOUNT.
    #[arg(long)]
    max_amount: Option<Decimal>,

    /// Print a CSV summary of every account after the script finishes.
    #[arg(long)]
    summary: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = LedgerConfig::from_env();
    if let Some(max_amount) = cli.max_amount {
        if max_amount <= Decimal::ZERO {
            miette::bail!("--max-amount must be positive, got {}", max_amount);
        }
        config.max_amount = max_amount;
    }

    let bank = Bank::with_config(
        Box::new(InMemoryAccountStore::new()),
        Box::new(InMemoryTransferStore::new()),
        config,
    );

    let source: Box<dyn Read> = match cli.input {
        Some(path) => Box::new(File::open(path).into_diagnostic()?),
        None => Box::new(io::stdin()),
    };

    for command in CommandReader::new(source).commands() {
        match command {
            Ok(command) => run(&bank, command).await,
            Err(e) => eprintln!("Error reading command: {}", e),
        }
    }

    if cli.summary {
        let accounts = bank.into_results().await?;
        let stdout = io::stdout();
        let mut writer = AccountWriter::new(stdout.lock());
        writer.write_accounts(accounts)?;
    }

    Ok(())
}

async fn run(bank: &Bank, command: Command) {
    match execute(bank, command).await {
        Ok(outcome) => println!("{}", outcome),
        Err(e) => eprintln!("Error processing command: {}", e),
    }
}
