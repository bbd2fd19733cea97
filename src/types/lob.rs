//! LOB (Large Object) types
//!
//! This module provides the column-side view of Oracle CLOB, NCLOB and BLOB
//! values: the kind of a LOB column, the content written back into it, and
//! the locator handed out by the session when a row is selected for update.

use bytes::Bytes;

use crate::error::{Error, Result};

/// Kind of a large-object column, resolved from its SQL type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LobKind {
    /// Character LOB in the database character set
    Clob,
    /// Character LOB in the national character set
    NClob,
    /// Binary LOB
    Blob,
}

impl LobKind {
    /// Resolve the LOB kind from a column's SQL type, e.g. `CLOB` or `BLOB`
    ///
    /// BFILE is not included: it is a read-only external file and is never
    /// written back.
    pub fn from_sql_type(sql_type: &str) -> Option<Self> {
        match sql_type.trim().to_ascii_uppercase().as_str() {
            "CLOB" => Some(LobKind::Clob),
            "NCLOB" => Some(LobKind::NClob),
            "BLOB" => Some(LobKind::Blob),
            _ => None,
        }
    }

    /// Check if this is a binary LOB
    pub fn is_binary(&self) -> bool {
        matches!(self, LobKind::Blob)
    }

    /// SQL literal that creates an empty LOB of this kind
    pub fn empty_literal(&self) -> &'static str {
        match self {
            LobKind::Clob | LobKind::NClob => "EMPTY_CLOB()",
            LobKind::Blob => "EMPTY_BLOB()",
        }
    }

    /// Human readable description of the content this kind accepts
    pub fn expected_content(&self) -> &'static str {
        match self {
            LobKind::Clob | LobKind::NClob => "character data",
            LobKind::Blob => "binary data",
        }
    }
}

/// Content to write into a LOB
#[derive(Debug, Clone, PartialEq)]
pub enum LobData {
    /// String data (for CLOB/NCLOB)
    String(String),
    /// Binary data (for BLOB)
    Bytes(Bytes),
}

impl LobData {
    /// Raw bytes sent over the wire (UTF-8 for character data)
    pub fn wire_bytes(&self) -> &[u8] {
        match self {
            LobData::String(s) => s.as_bytes(),
            LobData::Bytes(b) => b,
        }
    }

    /// Length of the content in LOB units: characters for CLOB, bytes for BLOB
    pub fn lob_length(&self) -> u64 {
        match self {
            LobData::String(s) => s.chars().count() as u64,
            LobData::Bytes(b) => b.len() as u64,
        }
    }

    /// Get the length of the data in bytes
    pub fn len(&self) -> usize {
        self.wire_bytes().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that this content can be stored in a LOB of the given kind
    pub fn check_kind(&self, column: &str, kind: LobKind) -> Result<()> {
        match (self, kind.is_binary()) {
            (LobData::String(_), false) | (LobData::Bytes(_), true) => Ok(()),
            _ => Err(Error::LobTypeMismatch {
                column: column.to_string(),
                expected: kind.expected_content(),
            }),
        }
    }
}

/// LOB locator - holds the reference to a LOB stored in the database
#[derive(Debug, Clone)]
pub struct LobLocator {
    /// The raw locator bytes from Oracle
    locator: Bytes,
    /// Size of the LOB in bytes (for BLOB) or characters (for CLOB)
    size: u64,
    /// LOB kind (CLOB, NCLOB, BLOB)
    kind: LobKind,
}

impl LobLocator {
    /// Create a new LOB locator from raw data
    pub fn new(locator: Bytes, size: u64, kind: LobKind) -> Self {
        Self {
            locator,
            size,
            kind,
        }
    }

    /// Get the size of the LOB
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the LOB kind
    pub fn kind(&self) -> LobKind {
        self.kind
    }

    /// Get the raw locator bytes (for sending to Oracle in LOB operations)
    pub fn locator_bytes(&self) -> &[u8] {
        &self.locator
    }
}
