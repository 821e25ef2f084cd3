use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for ledger, scheduling, and storage layers.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Invalid ledger document: {0}")]
    InvalidDocument(String),
    #[error("Transaction must keep at least one posting")]
    EmptyTransaction,
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, BudgetError>;

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}
