//! Error taxonomy for the store and workflow boundaries.

use thiserror::Error;

/// Errors surfaced by the backing store. Backend failures are wrapped in a
/// user-facing `Database error:` message and never silently swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Backend(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Validation failures for parsed vehicle records, rejected before any
/// persistence call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid VIN: {0}")]
    InvalidVin(String),
    #[error("Missing required vehicle information ({0})")]
    MissingField(&'static str),
}

/// Errors from the document ingestion workflow.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("T21 parser API is currently unavailable. Please try again later.")]
    ParserUnavailable,
    #[error("T21 parser error: {0}")]
    Parser(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
