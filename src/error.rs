//! Error types shared across the import pipeline.

use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that occur while parsing or importing a subscriber export.
///
/// Every variant is fatal: the run stops at the first error and rows already
/// committed stay in the database.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to connect to database: {0}")]
    Connection(#[source] tokio_postgres::Error),
    #[error("no account found with email {0}")]
    AccountNotFound(String),
    #[error("row {row}: expected at least 3 fields, found {fields}")]
    MalformedRow { row: u64, fields: usize },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
}
