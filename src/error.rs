//! Error types for the ledger core.
//!
//! Every fallible operation in the library returns [`LedgerError`]. The binary
//! wraps these in `anyhow` for reporting.

use std::fmt;
use std::path::PathBuf;

/// The four fields of a [`Transaction`](crate::types::Transaction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Timestamp,
    Amount,
    Description,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Timestamp => "timestamp",
            Field::Amount => "amount",
            Field::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid {field}: {reason}")]
    Validation { field: Field, reason: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("storage source not found: {}", .source_name.display())]
    NotFound { source_name: PathBuf },

    #[error("failed to parse record at line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: Box<LedgerError>,
    },

    #[error("malformed header: {0}")]
    Header(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn validation(field: Field, reason: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Attaches a 1-based line number to an error raised while loading.
    pub fn at_line(self, line: u64) -> Self {
        LedgerError::Parse {
            line,
            source: Box::new(self),
        }
    }

    /// The field that failed validation, looking through `Parse` wrappers.
    pub fn field(&self) -> Option<Field> {
        match self {
            LedgerError::Validation { field, .. } => Some(*field),
            LedgerError::Parse { source, .. } => source.field(),
            _ => None,
        }
    }

    /// The line a load failed at, if any.
    pub fn line(&self) -> Option<u64> {
        match self {
            LedgerError::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
