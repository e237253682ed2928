//! Audit-logging transaction manager.
//!
//! [`AuditedTransactionManager`] wraps a [`TransactionManager`] and records a
//! [`HistoryEntry`] for every successful mutation. It also adds keyword search
//! over descriptions. Everything else is forwarded to the wrapped manager.
//!
//! History timestamps come from a [`Clock`], so tests can pin them with
//! [`FixedClock`].
//!
//! ```
//! use transaction_ledger::{AuditedTransactionManager, TransactionCollection};
//!
//! let mut ledger = AuditedTransactionManager::new();
//! ledger.add_record(["1", "2024-03-01 14:30:00", "-4.20", "REFUND coffee"]).unwrap();
//! ledger.add_record(["2", "2024-03-01 15:00:00", "10", "payment"]).unwrap();
//!
//! assert_eq!(ledger.search_by_description("ref").count(), 1);
//! assert_eq!(ledger.get_history().count(), 2);
//! ```

use chrono::Local;
use std::fmt;
use std::io::{Read, Write};
use std::ops::Index;
use std::path::Path;
use std::slice;
use tracing::debug;

use crate::collection::TransactionCollection;
use crate::error::Result;
use crate::io;
use crate::manager::TransactionManager;
use crate::types::{Amount, TIMESTAMP_FORMAT, Timestamp, Transaction};

/// Source of the current time for history entries.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Kind of mutation recorded in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Add => f.write_str("ADD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: Timestamp,
    pub action: Action,
    /// The rendered transaction the action applied to.
    pub details: String,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} - {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.action,
            self.details
        )
    }
}

/// A [`TransactionManager`] with an append-only change history.
///
/// The history lives in memory only and is not written by
/// [`save_to_csv`](Self::save_to_csv).
#[derive(Debug)]
pub struct AuditedTransactionManager<C = SystemClock> {
    inner: TransactionManager,
    history: Vec<HistoryEntry>,
    clock: C,
}

impl AuditedTransactionManager<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates a manager holding the contents of a CSV file. Each loaded row
    /// is recorded in the history.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut manager = Self::new();
        manager.load_from_csv(path)?;
        Ok(manager)
    }
}

impl Default for AuditedTransactionManager<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> AuditedTransactionManager<C> {
    /// Creates an empty manager that stamps history entries with `clock`.
    ///
    /// # Arguments
    ///
    /// * `clock` - Source of history timestamps, e.g. a [`FixedClock`] in tests
    pub fn with_clock(clock: C) -> Self {
        AuditedTransactionManager {
            inner: TransactionManager::new(),
            history: Vec::new(),
            clock,
        }
    }

    /// Read access to the wrapped manager.
    pub fn manager(&self) -> &TransactionManager {
        &self.inner
    }

    /// Loads a CSV file through [`add_transaction`](TransactionCollection::add_transaction),
    /// so every committed row gets a history entry. A failed load adds nothing.
    pub fn load_from_csv(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let reader = io::read_transactions_from_file(path.as_ref())?;
        io::load_into(self, reader)
    }

    /// Like [`load_from_csv`](Self::load_from_csv), reading CSV from any source.
    ///
    /// # Errors
    ///
    /// Same as [`TransactionManager::load_from_reader`]. No history entry is
    /// recorded for a failed load.
    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> Result<usize> {
        let reader = io::TransactionReader::new(reader, "reader")?;
        io::load_into(self, reader)
    }

    pub fn save_to_csv(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.inner.save_to_csv(path)
    }

    /// Writes the transactions as CSV. The history is not written.
    ///
    /// # Errors
    ///
    /// Same as [`TransactionManager::save_to_writer`].
    pub fn save_to_writer<W: Write>(&self, writer: W) -> Result<usize> {
        self.inner.save_to_writer(writer)
    }

    pub fn sort_by_description(&mut self) {
        self.inner.sort_by_description();
    }

    pub fn sort_by_amount(&mut self) {
        self.inner.sort_by_amount();
    }

    pub fn filter_by_amount(&self, min_amount: Amount) -> impl Iterator<Item = &Transaction> + '_ {
        self.inner.filter_by_amount(min_amount)
    }

    /// Transactions whose description contains `keyword`, ignoring case.
    ///
    /// Plain substring match; an empty keyword matches everything.
    pub fn search_by_description(&self, keyword: &str) -> impl Iterator<Item = &Transaction> + '_ {
        let keyword = keyword.to_lowercase();
        self.inner
            .iter()
            .filter(move |tx| tx.description().to_lowercase().contains(&keyword))
    }

    /// Recorded history, oldest first.
    pub fn get_history(&self) -> slice::Iter<'_, HistoryEntry> {
        self.history.iter()
    }

    pub fn render_all(&self) -> Vec<String> {
        self.inner.render_all()
    }
}

impl<C: Clock> TransactionCollection for AuditedTransactionManager<C> {
    fn iter(&self) -> slice::Iter<'_, Transaction> {
        self.inner.iter()
    }

    fn get(&self, index: usize) -> Option<&Transaction> {
        self.inner.get(index)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn add_transaction(&mut self, transaction: Transaction) -> Result<()> {
        let details = transaction.to_string();
        self.inner.add_transaction(transaction)?;

        let entry = HistoryEntry {
            timestamp: self.clock.now(),
            action: Action::Add,
            details,
        };
        debug!("History: {}", entry);
        self.history.push(entry);
        Ok(())
    }
}

impl<C> Index<usize> for AuditedTransactionManager<C> {
    type Output = Transaction;

    fn index(&self, index: usize) -> &Transaction {
        &self.inner[index]
    }
}

impl<'a, C: Clock> IntoIterator for &'a AuditedTransactionManager<C> {
    type Item = &'a Transaction;
    type IntoIter = slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
