//! The module contains the errors the ledger can return.
//!
//! - [`Validation`] the input was rejected before touching storage.
//! - [`NotFound`] a referenced account, transaction or goal does not exist.
//! - [`Storage`] the underlying database failed.
//!
//!  [`Validation`]: LedgerError::Validation
//!  [`NotFound`]: LedgerError::NotFound
//!  [`Storage`]: LedgerError::Storage
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] DbErr),
}

impl LedgerError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
