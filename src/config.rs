//! Command-line interface definitions using Clap.
//!
//! ```text
//! transaction-ledger [--file PATH] [--save] <command> [args]
//! ```
//!
//! The data file is taken from `--file`, then the `LEDGER_FILE` environment
//! variable, then [`DEFAULT_FILE`].

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{Amount, parse_amount};

pub const DEFAULT_FILE: &str = "data.csv";
pub const FILE_ENV_VAR: &str = "LEDGER_FILE";

/// Transaction ledger - list, query and extend a CSV ledger file
#[derive(Debug, Parser)]
#[command(name = "transaction-ledger")]
#[command(version, about = "List, query and extend a CSV ledger of transactions", long_about = None)]
pub struct Cli {
    /// Ledger file to read (and write, for commands that change it)
    #[arg(short = 'f', long = "file", global = true, env = FILE_ENV_VAR, default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Write the reordered ledger back after a sort
    #[arg(long = "save", global = true)]
    pub save: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Print all transactions
    List,

    /// Print transactions sorted by description
    SortDescription,

    /// Print transactions sorted by amount
    SortAmount,

    /// Print transactions with amount >= MIN
    Filter {
        #[arg(value_parser = amount_arg, allow_negative_numbers = true)]
        min: Amount,
    },

    /// Print transactions whose description contains KEYWORD, ignoring case
    Search { keyword: String },

    /// Add a transaction (id = count + 1, timestamp = now) and save
    Add {
        #[arg(value_parser = amount_arg, allow_negative_numbers = true)]
        amount: Amount,

        /// Description words; everything after AMOUNT is taken literally
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },

    /// Print the change history of this run
    ///
    /// History is kept in memory only and is not stored in the ledger file,
    /// so a fresh run lists one ADD entry per row loaded at start-up.
    History,

    /// Print the number of transactions
    Count,
}

fn amount_arg(value: &str) -> Result<Amount, String> {
    parse_amount(value.as_bytes()).map_err(|e| e.to_string())
}
