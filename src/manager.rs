//! The base transaction manager.
//!
//! [`TransactionManager`] keeps transactions in insertion order and provides
//! sorting, filtering, and CSV load/save on top of the
//! [`TransactionCollection`] contract.

use std::io::{Read, Write};
use std::ops::Index;
use std::path::Path;
use std::slice;
use tracing::debug;

use crate::collection::TransactionCollection;
use crate::error::Result;
use crate::io;
use crate::types::{Amount, Transaction};

/// An ordered, in-memory collection of transactions.
///
/// Ids are not required to be unique; callers pick them.
#[derive(Debug, Default, Clone)]
pub struct TransactionManager {
    transactions: Vec<Transaction>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager holding the contents of a CSV file.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut manager = Self::new();
        manager.load_from_csv(path)?;
        Ok(manager)
    }

    /// Appends every transaction in a CSV file.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::NotFound`](crate::LedgerError::NotFound) if the
    /// file is missing, or [`LedgerError::Parse`](crate::LedgerError::Parse) on the
    /// first malformed row. On failure nothing from the file is added.
    pub fn load_from_csv(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let reader = io::read_transactions_from_file(path.as_ref())?;
        io::load_into(self, reader)
    }

    /// Like [`load_from_csv`](Self::load_from_csv), reading CSV from any source.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::Header`](crate::LedgerError::Header) if the
    /// header row is missing, or [`LedgerError::Parse`](crate::LedgerError::Parse)
    /// on the first malformed row. On failure nothing is added.
    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> Result<usize> {
        let reader = io::TransactionReader::new(reader, "reader")?;
        io::load_into(self, reader)
    }

    /// Writes the whole collection to `path`, replacing the file.
    pub fn save_to_csv(&self, path: impl AsRef<Path>) -> Result<usize> {
        io::write_transactions_to_file(path.as_ref(), &self.transactions)
    }

    /// Writes the whole collection as CSV, header row first.
    ///
    /// # Arguments
    ///
    /// * `writer` - Any output; it is flushed before returning
    ///
    /// # Returns
    ///
    /// The number of transactions written.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::Csv`](crate::LedgerError::Csv) or
    /// [`LedgerError::Io`](crate::LedgerError::Io) if the writer rejects the data.
    pub fn save_to_writer<W: Write>(&self, writer: W) -> Result<usize> {
        io::write_transactions(writer, &self.transactions)
    }

    /// Sorts by description, byte-wise and case-sensitive. Stable.
    pub fn sort_by_description(&mut self) {
        self.transactions
            .sort_by(|a, b| a.description().cmp(b.description()));
    }

    /// Sorts by amount, smallest first. Stable.
    pub fn sort_by_amount(&mut self) {
        self.transactions.sort_by_key(|tx| tx.amount());
    }

    /// Transactions with `amount >= min_amount`, in collection order.
    pub fn filter_by_amount(&self, min_amount: Amount) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions
            .iter()
            .filter(move |tx| tx.amount() >= min_amount)
    }

    /// One display line per transaction.
    pub fn render_all(&self) -> Vec<String> {
        self.transactions.iter().map(|tx| tx.to_string()).collect()
    }
}

impl TransactionCollection for TransactionManager {
    fn iter(&self) -> slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    fn len(&self) -> usize {
        self.transactions.len()
    }

    fn add_transaction(&mut self, transaction: Transaction) -> Result<()> {
        debug!("Adding transaction {}", transaction.id());
        self.transactions.push(transaction);
        Ok(())
    }
}

impl Index<usize> for TransactionManager {
    type Output = Transaction;

    fn index(&self, index: usize) -> &Transaction {
        &self.transactions[index]
    }
}

impl<'a> IntoIterator for &'a TransactionManager {
    type Item = &'a Transaction;
    type IntoIter = slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

#[cfg(test)]
fn manager_from(rows: &[(i64, &str, &str)]) -> TransactionManager {
    use crate::types::parse_timestamp;
    use std::str::FromStr;

    let timestamp = parse_timestamp(b"2024-03-01 12:00:00").unwrap();
    let mut manager = TransactionManager::new();
    for (id, amount, description) in rows {
        let tx = Transaction::new(*id, timestamp, Amount::from_str(amount).unwrap(), *description)
            .unwrap();
        manager.add_transaction(tx).unwrap();
    }
    manager
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::types::Timestamp;
    use chrono::DateTime;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    /// Generates transactions with:
    /// - Ids: 0-10000 (duplicates allowed)
    /// - Amounts: -10000.00 to 10000.00 in cents
    /// - Descriptions: short mixed-case text, including commas and quotes
    /// - Timestamps: whole seconds between 2000 and 2038
    fn transaction_strategy() -> impl Strategy<Value = Vec<Transaction>> {
        prop::collection::vec(
            (
                0u64..=10_000u64,
                -1_000_000i64..=1_000_000i64,
                "[a-zA-Z ,\"]{0,12}",
                946_684_800i64..2_145_916_800i64,
            ),
            0..=50,
        )
        .prop_map(|params| {
            params
                .into_iter()
                .map(|(id, cents, description, secs)| {
                    let timestamp: Timestamp = DateTime::from_timestamp(secs, 0)
                        .expect("in range")
                        .naive_utc();
                    Transaction::new(id, timestamp, Decimal::new(cents, 2), description)
                        .expect("valid transaction")
                })
                .collect()
        })
    }

    fn manager_with(transactions: &[Transaction]) -> TransactionManager {
        let mut manager = TransactionManager::new();
        for tx in transactions {
            manager.add_transaction(tx.clone()).unwrap();
        }
        manager
    }

    /// Property test: sorting by amount yields a non-decreasing sequence and
    /// sorting again changes nothing.
    #[test]
    fn sort_by_amount_orders_and_is_idempotent() {
        proptest!(|(transactions in transaction_strategy())| {
            let mut manager = manager_with(&transactions);
            manager.sort_by_amount();

            let once: Vec<Transaction> = manager.iter().cloned().collect();
            prop_assert!(once.windows(2).all(|w| w[0].amount() <= w[1].amount()));

            manager.sort_by_amount();
            prop_assert_eq!(manager.iter().cloned().collect::<Vec<_>>(), once);
        });
    }

    #[test]
    fn sort_by_description_orders_and_is_idempotent() {
        proptest!(|(transactions in transaction_strategy())| {
            let mut manager = manager_with(&transactions);
            manager.sort_by_description();

            let once: Vec<Transaction> = manager.iter().cloned().collect();
            prop_assert!(once.windows(2).all(|w| w[0].description() <= w[1].description()));

            manager.sort_by_description();
            prop_assert_eq!(manager.iter().cloned().collect::<Vec<_>>(), once);
        });
    }

    /// Property test: the filter returns exactly the qualifying subset, in order.
    #[test]
    fn filter_by_amount_matches_subset() {
        proptest!(|(transactions in transaction_strategy(), cents in -1_000_000i64..=1_000_000i64)| {
            let manager = manager_with(&transactions);
            let min = Decimal::new(cents, 2);

            let filtered: Vec<&Transaction> = manager.filter_by_amount(min).collect();
            let expected: Vec<&Transaction> = transactions.iter().filter(|tx| tx.amount() >= min).collect();
            prop_assert_eq!(filtered, expected);
        });
    }

    /// Property test: saving then loading gives back the same transactions in
    /// the same order.
    #[test]
    fn csv_round_trip_preserves_transactions() {
        proptest!(|(transactions in transaction_strategy())| {
            let manager = manager_with(&transactions);

            let mut buffer = Vec::new();
            prop_assert_eq!(manager.save_to_writer(&mut buffer).unwrap(), transactions.len());

            let mut loaded = TransactionManager::new();
            loaded.load_from_reader(buffer.as_slice()).unwrap();
            prop_assert_eq!(loaded.iter().cloned().collect::<Vec<_>>(), transactions);
        });
    }
}
