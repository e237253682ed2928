//! Core data types for the ledger.
//!
//! This module defines the [`Transaction`] entity and the field rules every
//! transaction must satisfy, along with type aliases for domain-specific values.
//!
//! # Type Aliases
//!
//! - [`TxId`]: Type alias for transaction identifiers (u64, never negative)
//! - [`Amount`]: Type alias for monetary amounts (Decimal, signed)
//! - [`Timestamp`]: Type alias for record date-times (NaiveDateTime, no zone)
//!
//! # Field Rules
//!
//! A transaction is only ever produced by [`Transaction::new`] or
//! [`Transaction::parse`], both of which check:
//! - `id` is a non-negative integer
//! - `timestamp` is a valid date-time in [`TIMESTAMP_FORMAT`]
//! - `amount` is a finite number
//! - `description` is text (valid UTF-8)
//!
//! Fields are private and there are no setters, so a value that exists has
//! passed every rule.
//!
//! # Examples
//!
//! Creating a debit:
//! ```
//! use transaction_ledger::types::Transaction;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let timestamp = NaiveDate::from_ymd_opt(2024, 3, 1)
//!     .unwrap()
//!     .and_hms_opt(14, 30, 0)
//!     .unwrap();
//! let tx = Transaction::new(7, timestamp, Decimal::from_str("-12.5").unwrap(), "coffee").unwrap();
//! assert_eq!(tx.to_string(), "№7 | 2024-03-01 14:30:00 | -12.50 | coffee");
//! ```
//!
//! Parsing raw storage fields:
//! ```
//! use transaction_ledger::types::Transaction;
//!
//! let tx = Transaction::parse("1", "2024-03-01 14:30:00", "100.0", "salary").unwrap();
//! assert_eq!(tx.id(), 1);
//! assert!(Transaction::parse("-1", "2024-03-01 14:30:00", "100.0", "salary").is_err());
//! ```

use chrono::NaiveDateTime;
use csv::ByteRecord;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::collection::RECORD_FIELDS;
use crate::error::{Field, LedgerError, Result};

pub type TxId = u64;
pub type Amount = Decimal;
pub type Timestamp = NaiveDateTime;

/// Date-time layout used for display and storage, e.g. `2024-03-01 14:30:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single ledger record.
///
/// `Debug` lists every field by name and is meant for diagnostics; `Display`
/// is the compact one-line form shown to users:
///
/// `№{id} | {timestamp} | {amount with two decimals} | {description}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TxId,
    timestamp: Timestamp,
    amount: Amount,
    description: String,
}

impl Transaction {
    /// Builds a validated transaction.
    ///
    /// `id` accepts any integer type; negative values (or values that do not
    /// fit a [`TxId`]) fail with a [`LedgerError::Validation`] on [`Field::Id`].
    pub fn new<I>(
        id: I,
        timestamp: Timestamp,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<Self>
    where
        I: TryInto<TxId>,
    {
        let id = id
            .try_into()
            .map_err(|_| LedgerError::validation(Field::Id, "must be a non-negative integer"))?;

        Ok(Transaction {
            id,
            timestamp,
            amount,
            description: description.into(),
        })
    }

    /// Builds a transaction from raw text fields, as read from storage.
    ///
    /// Fields are checked in order (id, timestamp, amount, description) and
    /// the first failure is returned.
    pub fn parse(
        id: impl AsRef<[u8]>,
        timestamp: impl AsRef<[u8]>,
        amount: impl AsRef<[u8]>,
        description: impl AsRef<[u8]>,
    ) -> Result<Self> {
        let record = ByteRecord::from(vec![
            id.as_ref(),
            timestamp.as_ref(),
            amount.as_ref(),
            description.as_ref(),
        ]);
        Transaction::from_record(&record, None)
    }

    /// Builds a transaction from one CSV record.
    ///
    /// # Arguments
    ///
    /// * `record` - The raw row
    /// * `headers` - The header row, when fields should be matched by name
    ///   rather than by position
    ///
    /// # Errors
    ///
    /// - [`LedgerError::TypeMismatch`] if the row does not have exactly
    ///   [`RECORD_FIELDS`] fields
    /// - [`LedgerError::Validation`] for the first field that breaks its rule
    pub fn from_record(record: &ByteRecord, headers: Option<&ByteRecord>) -> Result<Self> {
        if record.len() != RECORD_FIELDS {
            return Err(LedgerError::TypeMismatch {
                expected: "a transaction row of 4 fields",
                found: format!("a row of {} fields", record.len()),
            });
        }

        let record: TransactionRecord = record.deserialize(headers)?;
        Transaction::try_from(record)
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "№{} | {} | {:.2} | {}",
            self.id,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            self.description
        )
    }
}

/// One storage row, with each field already checked against its rule.
///
/// Field deserializers never fail at the serde level; they capture the
/// outcome so [`TryFrom`] can report the first bad field in column order.
#[derive(Debug, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "№", deserialize_with = "deserialize_id")]
    id: Result<TxId>,
    #[serde(rename = "дата и время", deserialize_with = "deserialize_timestamp")]
    timestamp: Result<Timestamp>,
    #[serde(rename = "сумма", deserialize_with = "deserialize_amount")]
    amount: Result<Amount>,
    #[serde(rename = "описание транзакции", deserialize_with = "deserialize_description")]
    description: Result<String>,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = LedgerError;

    fn try_from(record: TransactionRecord) -> Result<Self> {
        let id = record.id?;
        let timestamp = record.timestamp?;
        let amount = record.amount?;
        let description = record.description?;

        Transaction::new(id, timestamp, amount, description)
    }
}

/// Visitor that runs a field rule over the raw bytes of a CSV field.
struct FieldVisitor<T> {
    field: Field,
    parse: fn(&[u8]) -> Result<T>,
}

impl<'de, T> Visitor<'de> for FieldVisitor<T> {
    type Value = Result<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "the {} field of a transaction", self.field)
    }

    fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok((self.parse)(value))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok((self.parse)(value.as_bytes()))
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Result<TxId>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_bytes(FieldVisitor {
        field: Field::Id,
        parse: parse_id,
    })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<Result<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_bytes(FieldVisitor {
        field: Field::Timestamp,
        parse: parse_timestamp,
    })
}

/// Custom deserializer for the amount column.
///
/// Goes through [`parse_amount`], so scientific notation written by older
/// files (`-5e-05`) is read exactly instead of via a float.
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Result<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_bytes(FieldVisitor {
        field: Field::Amount,
        parse: parse_amount,
    })
}

fn deserialize_description<'de, D>(deserializer: D) -> std::result::Result<Result<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_bytes(FieldVisitor {
        field: Field::Description,
        parse: parse_description,
    })
}

fn as_text(field: Field, raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw).map_err(|_| LedgerError::validation(field, "must be valid UTF-8 text"))
}

/// Reads a description. Whitespace is kept as written.
pub fn parse_description(raw: &[u8]) -> Result<String> {
    as_text(Field::Description, raw).map(str::to_string)
}

/// Parses a transaction id. Surrounding whitespace is ignored.
pub fn parse_id(raw: &[u8]) -> Result<TxId> {
    let text = as_text(Field::Id, raw)?.trim();
    text.parse::<TxId>().map_err(|_| {
        let reason = if text.starts_with('-') {
            format!("must be a non-negative integer, got '{}'", text)
        } else {
            format!("must be an integer, got '{}'", text)
        };
        LedgerError::validation(Field::Id, reason)
    })
}

/// Parses a date-time in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(raw: &[u8]) -> Result<Timestamp> {
    let text = as_text(Field::Timestamp, raw)?;
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|e| {
        LedgerError::validation(
            Field::Timestamp,
            format!("must be a date-time like 2024-03-01 14:30:00, got '{}': {}", text, e),
        )
    })
}

/// Parses an amount.
///
/// Accepts plain decimals (`12.5`, `-3`) and scientific notation (`1e-05`),
/// which older data files contain. Surrounding whitespace is ignored.
pub fn parse_amount(raw: &[u8]) -> Result<Amount> {
    let text = as_text(Field::Amount, raw)?.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| LedgerError::validation(Field::Amount, format!("must be a number, got '{}'", text)))
}
