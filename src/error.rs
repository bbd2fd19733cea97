//! Error types for the Oracle model layer
//!
//! This module defines the errors raised while persisting records, from
//! schema configuration problems up to failures of the LOB write-back that
//! follows a committed row write.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Oracle model layer
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Schema catalog unreachable or malformed
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No schema registered for the table
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Attribute does not name a visible column of the table
    #[error("unknown attribute '{attribute}' for table {table}")]
    UnknownAttribute { table: String, attribute: String },

    /// Host framework version string could not be parsed
    #[error("invalid host version: {0}")]
    InvalidHostVersion(String),

    // =========================================================================
    // Write-Back Errors
    // =========================================================================
    /// Locator query returned no row
    #[error("statement {sql} returned no rows")]
    RecordNotFound { sql: String },

    /// Record has no primary key value to address its LOBs by
    #[error("record of table {table} has no primary key value")]
    MissingPrimaryKey { table: String },

    /// Attribute value does not fit the LOB column
    #[error("value for LOB column {column} must be {expected}")]
    LobTypeMismatch { column: String, expected: &'static str },

    // =========================================================================
    // Adapter Errors
    // =========================================================================
    /// Oracle database error with error code
    #[error("ORA-{code:05}: {message}")]
    Oracle { code: u32, message: String },

    /// Data conversion error
    #[error("data conversion error: {0}")]
    DataConversion(String),

    /// Serialized attribute could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a new Oracle database error
    pub fn oracle(code: u32, message: impl Into<String>) -> Self {
        Error::Oracle {
            code,
            message: message.into(),
        }
    }

    /// Check if this error comes from schema or adapter configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::UnknownTable(_)
                | Error::UnknownAttribute { .. }
                | Error::InvalidHostVersion(_)
        )
    }

    /// Check if this error was raised while writing LOB content back.
    ///
    /// Adapter and I/O failures are included: the coordinator only reaches the
    /// adapter after the primary write, so the row may already be committed.
    pub fn is_write_back_error(&self) -> bool {
        matches!(
            self,
            Error::RecordNotFound { .. }
                | Error::MissingPrimaryKey { .. }
                | Error::LobTypeMismatch { .. }
                | Error::Oracle { .. }
                | Error::Serialization(_)
                | Error::Io(_)
        )
    }
}
