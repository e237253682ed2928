//! Transaction ledger application.
//!
//! This program loads a CSV ledger file, runs one command against it, and
//! prints the result to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --file data.csv list
//! cargo run -- filter 100
//! cargo run -- add -12.50 coffee beans
//! ```
//!
//! Each run is a separate process and the change history is not stored in
//! the ledger file, so `history` shows only the current run: one ADD entry per
//! row loaded at start-up.
//!
//! # File Format
//!
//! The ledger file is CSV with the header row
//! `№,дата и время,сумма,описание транзакции` and one transaction per row:
//! - `№`: Transaction id (non-negative integer)
//! - `дата и время`: Date and time, `YYYY-MM-DD HH:MM:SS`
//! - `сумма`: Amount (decimal, negative for debits)
//! - `описание транзакции`: Free-text description
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `info`).
use anyhow::{Context, Result};
use chrono::Timelike;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use transaction_ledger::config::{Cli, Command};
use transaction_ledger::{AuditedTransactionManager, Clock, SystemClock, Transaction, TransactionCollection};

/// Main entry point for the ledger application.
///
/// 1. Parses the command line (`LEDGER_FILE` is the fallback data file)
/// 2. Loads the ledger file (a load failure ends the run)
/// 3. Runs the command and prints the result
/// 4. Saves the file after `add`, or after a sort when `--save` is given
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut ledger = AuditedTransactionManager::from_csv(&cli.file)
        .with_context(|| format!("Failed to load ledger from: {}", cli.file.display()))?;

    match &cli.command {
        Command::List => print_all(&ledger),
        Command::SortDescription => {
            ledger.sort_by_description();
            print_all(&ledger);
        }
        Command::SortAmount => {
            ledger.sort_by_amount();
            print_all(&ledger);
        }
        Command::Filter { min } => {
            for tx in ledger.filter_by_amount(*min) {
                println!("{}", tx);
            }
        }
        Command::Search { keyword } => {
            for tx in ledger.search_by_description(keyword) {
                println!("{}", tx);
            }
        }
        Command::Add {
            amount,
            description,
        } => {
            let now = SystemClock.now().with_nanosecond(0).unwrap_or_else(|| SystemClock.now());
            let tx = Transaction::new(ledger.len() + 1, now, *amount, description.join(" "))?;
            println!("{}", tx);
            ledger.add_transaction(tx)?;
        }
        Command::History => {
            for entry in ledger.get_history() {
                println!("{}", entry);
            }
        }
        Command::Count => println!("{}", ledger.len()),
    }

    let changed = matches!(cli.command, Command::Add { .. })
        || (cli.save && matches!(cli.command, Command::SortDescription | Command::SortAmount));
    if changed {
        ledger
            .save_to_csv(&cli.file)
            .with_context(|| format!("Failed to save ledger to: {}", cli.file.display()))?;
    }

    Ok(())
}

fn print_all(ledger: &AuditedTransactionManager) {
    for line in ledger.render_all() {
        println!("{}", line);
    }
}
