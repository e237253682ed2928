//! Input/Output operations for ledger storage.
//!
//! Transactions are stored as UTF-8 CSV with a fixed header row and four
//! columns per record (see [`HEADERS`]). This module reads such data into
//! transactions row by row and writes collections back out.

use serde::Serialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::collection::{RECORD_FIELDS, TransactionCollection};
use crate::error::{LedgerError, Result};
use crate::types::{Amount, TIMESTAMP_FORMAT, Transaction, TxId};

/// Header labels, in column order. Existing data files use exactly these.
pub const HEADERS: [&str; RECORD_FIELDS] = ["№", "дата и время", "сумма", "описание транзакции"];

/// One CSV row as written to storage.
#[derive(Debug, Serialize)]
struct TransactionRow<'a> {
    id: TxId,
    timestamp: String,
    amount: Amount,
    description: &'a str,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        TransactionRow {
            id: tx.id(),
            timestamp: tx.timestamp().format(TIMESTAMP_FORMAT).to_string(),
            amount: tx.amount(),
            description: tx.description(),
        }
    }
}

/// An iterator over transactions read from CSV data.
///
/// Owns the CSV reader so rows are parsed one at a time. Rows are
/// deserialized against the header row, and each error carries the 1-based
/// line it was found on.
pub struct TransactionReader<R> {
    reader: csv::Reader<R>,
    headers: csv::ByteRecord,
    record: csv::ByteRecord,
    source: String,
}

impl<R: Read> TransactionReader<R> {
    /// Wraps `reader`, checking the header row up front.
    ///
    /// Completely empty input is accepted and yields no transactions.
    ///
    /// # Arguments
    ///
    /// * `reader` - CSV data, header row first
    /// * `source` - Name of the data, used in log messages
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Parse`] at line 1 if the header row cannot be
    /// read or its labels differ from [`HEADERS`].
    pub fn new(reader: R, source: impl Into<String>) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = reader
            .byte_headers()
            .map_err(|e| LedgerError::from(e).at_line(1))?
            .clone();
        if !headers.is_empty() && headers.iter().ne(HEADERS.iter().map(|h| h.as_bytes())) {
            let found: Vec<String> = headers
                .iter()
                .map(|h| String::from_utf8_lossy(h).into_owned())
                .collect();
            return Err(LedgerError::Header(format!(
                "expected {:?}, found {:?}",
                HEADERS, found
            ))
            .at_line(1));
        }

        Ok(TransactionReader {
            reader,
            headers,
            record: csv::ByteRecord::new(),
            source: source.into(),
        })
    }

    /// Name of the data being read, used in log messages.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<R: Read> Iterator for TransactionReader<R> {
    type Item = Result<Transaction>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map_or(0, |p| p.line());
                Some(
                    Transaction::from_record(&self.record, Some(&self.headers))
                        .map_err(|e| e.at_line(line)),
                )
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                Some(Err(LedgerError::from(e).at_line(line)))
            }
        }
    }
}

/// Opens a CSV file for reading.
///
/// # Errors
///
/// - [`LedgerError::NotFound`] if `path` does not exist
/// - [`LedgerError::Io`] if it exists but cannot be opened
/// - [`LedgerError::Parse`] if the header row is wrong
pub fn read_transactions_from_file(path: &Path) -> Result<TransactionReader<File>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LedgerError::NotFound {
            source_name: path.to_path_buf(),
        },
        _ => LedgerError::Io(e),
    })?;

    TransactionReader::new(file, path.display().to_string())
}

/// Reads every row from `reader` and adds the results to `collection`.
///
/// All rows are parsed before any is added: if one row is bad the load fails
/// and `collection` is left exactly as it was. Returns the number of rows added.
pub fn load_into<C, R>(collection: &mut C, reader: TransactionReader<R>) -> Result<usize>
where
    C: TransactionCollection,
    R: Read,
{
    let source = reader.source().to_string();
    let transactions = match reader.collect::<Result<Vec<_>>>() {
        Ok(transactions) => transactions,
        Err(e) => {
            warn!("Rejected load from {}: {}", source, e);
            return Err(e);
        }
    };

    let count = transactions.len();
    for tx in transactions {
        debug!("Loaded transaction {}", tx.id());
        collection.add_transaction(tx)?;
    }

    info!("Loaded {} transactions from {}", count, source);
    Ok(count)
}

/// Writes the header row and one row per transaction to `writer`.
///
/// The header is written even when there are no transactions.
pub fn write_transactions<'a, W, I>(writer: W, transactions: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(HEADERS)?;

    let mut count = 0;
    for tx in transactions {
        writer.serialize(TransactionRow::from(tx))?;
        count += 1;
    }

    writer.flush()?;

    Ok(count)
}

/// Writes transactions to `path`, replacing any existing file.
pub fn write_transactions_to_file<'a, I>(path: &Path, transactions: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let file = File::create(path)?;
    let count = write_transactions(file, transactions)?;
    info!("Saved {} transactions to {}", count, path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Field;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn read_all(data: &str) -> Result<Vec<Transaction>> {
        TransactionReader::new(data.as_bytes(), "inline")?.collect()
    }

    #[test]
    fn test_input_file_reading() {
        let reader = read_transactions_from_file(Path::new("test-data.csv")).unwrap();

        let transactions: Vec<Transaction> = reader.map(|result| result.unwrap()).collect();

        // Verify we read all 6 transactions (excluding header)
        assert_eq!(transactions.len(), 6);

        assert_eq!(transactions[0].id(), 1);
        assert_eq!(transactions[0].amount(), Decimal::from_str("1500.0").unwrap());
        assert_eq!(transactions[0].description(), "Зарплата");

        // Quoted description with an embedded comma
        assert_eq!(transactions[2].description(), "invoice ref-22, March");

        // Debit stored in scientific notation by an older writer
        assert_eq!(transactions[4].amount(), Decimal::from_str("-0.00005").unwrap());

        assert_eq!(
            transactions[5].timestamp().format(TIMESTAMP_FORMAT).to_string(),
            "2024-03-05 08:00:00"
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_transactions_from_file(Path::new("no-such-ledger.csv"))
            .err()
            .unwrap();
        match err {
            LedgerError::NotFound { source_name } => {
                assert_eq!(source_name, Path::new("no-such-ledger.csv"))
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(read_all("").unwrap().is_empty());
        assert!(read_all("№,дата и время,сумма,описание транзакции\n").unwrap().is_empty());
    }

    #[test]
    fn wrong_header_fails_at_line_one() {
        let err = read_all("id,date,amount,description\n1,2024-03-01 10:00:00,1,x\n")
            .err()
            .unwrap();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn bad_row_reports_its_line() {
        let data = "№,дата и время,сумма,описание транзакции\n\
                    1,2024-03-01 10:00:00,1,a\n\
                    2,2024-03-01 10:00:00,oops,b\n\
                    3,2024-03-01 10:00:00,3,c\n";
        let err = read_all(data).err().unwrap();
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.field(), Some(Field::Amount));
    }

    #[test]
    fn short_row_is_a_type_mismatch() {
        let data = "№,дата и время,сумма,описание транзакции\n1,2024-03-01 10:00:00,1\n";
        let err = read_all(data).err().unwrap();
        match err {
            LedgerError::Parse { line, source } => {
                assert_eq!(line, 2);
                assert!(matches!(*source, LedgerError::TypeMismatch { .. }));
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn empty_collection_still_writes_header() {
        let mut out = Vec::new();
        let count = write_transactions(&mut out, std::iter::empty()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "№,дата и время,сумма,описание транзакции\n"
        );
    }

    #[test]
    fn writer_quotes_descriptions_that_need_it() {
        let tx = Transaction::parse("4", "2024-03-01 10:00:00", "-12.50", "coffee, \"large\"").unwrap();
        let mut out = Vec::new();
        write_transactions(&mut out, [&tx]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("4,2024-03-01 10:00:00,-12.50,\"coffee, \"\"large\"\"\"\n"));

        let back = read_all(&text).unwrap();
        assert_eq!(back, vec![tx]);
    }
}
