//! The capability contract shared by every transaction collection.

use csv::ByteRecord;
use std::slice;

use crate::error::Result;
use crate::types::Transaction;

/// Number of fields in a transaction row.
pub const RECORD_FIELDS: usize = 4;

/// An ordered collection of [`Transaction`]s.
///
/// Implementors own their storage. `iter` starts over on every call and walks
/// insertion order, unless a sort has reordered the underlying sequence.
pub trait TransactionCollection {
    fn iter(&self) -> slice::Iter<'_, Transaction>;

    fn get(&self, index: usize) -> Option<&Transaction>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a transaction to the end of the collection.
    fn add_transaction(&mut self, transaction: Transaction) -> Result<()>;

    /// Adds a transaction given as raw row fields.
    ///
    /// A row that does not have exactly [`RECORD_FIELDS`] fields is not a
    /// transaction at all and fails with
    /// [`LedgerError::TypeMismatch`](crate::LedgerError::TypeMismatch).
    /// Otherwise the fields go through [`Transaction::from_record`] and the
    /// result is handed to [`add_transaction`](Self::add_transaction).
    fn add_record<I, F>(&mut self, fields: I) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let transaction = transaction_from_fields(fields)?;
        self.add_transaction(transaction)
    }
}

/// Converts one row of raw fields into a [`Transaction`], matching fields by
/// position.
pub(crate) fn transaction_from_fields<I, F>(fields: I) -> Result<Transaction>
where
    I: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let record: ByteRecord = fields.into_iter().collect();
    Transaction::from_record(&record, None)
}

/// Checks raw field values against the same rules [`Transaction::parse`] applies,
/// without building anything.
///
/// ```
/// use transaction_ledger::validate_transaction_data;
///
/// assert!(validate_transaction_data("1", "2024-03-01 14:30:00", "-9.99", "fee"));
/// assert!(!validate_transaction_data("1", "01/03/2024", "-9.99", "fee"));
/// ```
pub fn validate_transaction_data(
    id: impl AsRef<[u8]>,
    timestamp: impl AsRef<[u8]>,
    amount: impl AsRef<[u8]>,
    description: impl AsRef<[u8]>,
) -> bool {
    Transaction::parse(id, timestamp, amount, description).is_ok()
}
