//! In-memory ledger of financial transactions with CSV persistence.
//!
//! - [`types`]: the validated [`Transaction`] entity
//! - [`collection`]: the [`TransactionCollection`] contract and
//!   [`validate_transaction_data`]
//! - [`manager`]: [`TransactionManager`], ordered storage with sort, filter and
//!   load/save
//! - [`audit`]: [`AuditedTransactionManager`], adds change history and keyword
//!   search
//! - [`io`]: CSV reading and writing
//! - [`config`]: command-line configuration for the binary

pub mod audit;
pub mod collection;
pub mod config;
pub mod error;
pub mod io;
pub mod manager;
pub mod types;

pub use audit::{Action, AuditedTransactionManager, Clock, FixedClock, HistoryEntry, SystemClock};
pub use collection::{TransactionCollection, validate_transaction_data};
pub use error::{Field, LedgerError, Result};
pub use manager::TransactionManager;
pub use types::{Amount, Timestamp, Transaction, TxId};
