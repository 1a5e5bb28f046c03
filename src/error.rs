//! Error types for shelf browse operations.
//!
//! This module provides the [`ShelfError`] type for all library operations,
//! the [`StoreError`] type returned by document store and holdings clients,
//! and the [`Result`] convenience type.

use std::time::Duration;
use thiserror::Error;

/// Error type for all shelf browse operations.
///
/// Parse failures of individual call numbers are not errors; they are
/// reported through [`crate::shelfkey::encode`] returning `None`.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Missing or conflicting browse origin.
    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),

    /// Requested window width is zero or above the configured maximum.
    #[error("Invalid width {width}: must be between 1 and {max}")]
    InvalidWidth {
        /// The requested width.
        width: usize,
        /// The configured maximum width.
        max: usize,
    },

    /// Offset hint does not fit inside the requested width.
    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    /// An explicit starting call number could not be tokenized.
    #[error("Malformed call number: {0:?}")]
    MalformedCallNumber(String),

    /// The origin document does not exist in the document store.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The document store or holdings service failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A store call did not complete before the request deadline.
    #[error("Store query timed out after {0:?}")]
    Timeout(Duration),

    /// The enclosing request was cancelled while a store call was pending.
    #[error("Request cancelled")]
    Cancelled,

    /// The LCC classification table is malformed.
    #[error("Invalid LCC table: {0}")]
    LccTable(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error while reading a table or configuration file.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV decoding error while reading a classification table.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON decoding error while reading configuration.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors reported by document store and holdings service clients.
///
/// Retry policy belongs to the client that produces these; the browse and
/// status engines surface them unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend reported its own timeout.
    #[error("backend timed out: {0}")]
    Timeout(String),

    /// The backend answered with an error.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Convenience type alias for [`std::result::Result`] with [`ShelfError`].
pub type Result<T> = std::result::Result<T, ShelfError>;
