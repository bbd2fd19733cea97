//! Connection adapters
//!
//! Two seams live here:
//!
//! - [`ConnectionAdapter`] is what the save lifecycle talks to: it performs
//!   the primary row write and the out-of-band LOB write-back, and reports
//!   whether it is the enhanced adapter or the emulation adapter.
//! - [`OracleSession`] is the low-level connection the enhanced adapter
//!   drives: statement execution plus locator-based LOB writes.
//!
//! [`OracleEnhancedAdapter`] connects the two.

use indexmap::IndexMap;
use tokio::sync::Mutex;

use crate::attributes::{persistable_attributes, AttributeFilter};
use crate::config::AdapterConfig;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::schema::{ColumnDescriptor, TableSchema};
use crate::sql;
use crate::types::{LobData, LobKind, LobLocator};
use crate::value::Value;

static NULL: Value = Value::Null;

/// Flavour of an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    /// Full Oracle enhanced adapter, including LOB write-back
    Enhanced,
    /// Compatibility adapter that mimics the plain Oracle adapter
    Emulation,
}

/// Adapter used by the save lifecycle
#[allow(async_fn_in_trait)]
pub trait ConnectionAdapter {
    /// Which flavour this adapter presents
    fn kind(&self) -> AdapterKind;

    /// Insert a new row for the record, returning the number of rows written
    async fn insert_row(&self, schema: &TableSchema, record: &Record) -> Result<u64>;

    /// Update the existing row of the record, returning the number of rows
    /// written
    async fn update_row(&self, schema: &TableSchema, record: &Record) -> Result<u64>;

    /// Write LOB content of the given columns back into an existing row
    async fn write_lobs(
        &self,
        table_name: &str,
        schema: &TableSchema,
        attributes: &IndexMap<String, Value>,
        columns: &[ColumnDescriptor],
    ) -> Result<()>;
}

/// Low-level Oracle connection driven by [`OracleEnhancedAdapter`]
#[allow(async_fn_in_trait)]
pub trait OracleSession {
    /// Execute a DML statement, returning the number of affected rows
    async fn execute(&mut self, sql: &str, binds: &[Value]) -> Result<u64>;

    /// Run a single-column locator query, returning the locator of the first
    /// row or `None` when no row matched
    async fn select_lob_locator(
        &mut self,
        sql: &str,
        binds: &[Value],
        kind: LobKind,
    ) -> Result<Option<LobLocator>>;

    /// Write data to a LOB
    ///
    /// `offset` is 1-based, in characters for CLOB and bytes for BLOB.
    async fn write_lob(&mut self, locator: &LobLocator, offset: u64, data: &[u8]) -> Result<()>;

    /// Trim a LOB to a new length
    async fn trim_lob(&mut self, locator: &LobLocator, new_size: u64) -> Result<()>;
}

/// Oracle enhanced adapter on top of an [`OracleSession`]
///
/// The session is held exclusively for each statement, and for the whole
/// lock/write/trim sequence of each LOB column.
///
/// # Example
///
/// ```rust,ignore
/// let config = AdapterConfig::new().emulate_oracle_adapter(false);
/// let adapter = OracleEnhancedAdapter::establish(config, session)?;
/// assert_eq!(adapter.kind(), AdapterKind::Enhanced);
/// ```
#[derive(Debug)]
pub struct OracleEnhancedAdapter<S> {
    session: Mutex<S>,
    kind: AdapterKind,
    lob_write_chunk_size: usize,
}

impl<S: OracleSession> OracleEnhancedAdapter<S> {
    /// Build an adapter around an established session
    ///
    /// With `emulate_oracle_adapter` set the adapter presents itself as the
    /// emulation adapter: rows are still written, LOBs are never flushed.
    pub fn establish(config: AdapterConfig, session: S) -> Result<Self> {
        config.validate()?;
        let kind = if config.emulate_oracle_adapter {
            AdapterKind::Emulation
        } else {
            AdapterKind::Enhanced
        };
        tracing::debug!(
            kind = ?kind,
            host_version = %config.host_version,
            "Established Oracle adapter"
        );
        Ok(Self {
            session: Mutex::new(session),
            kind,
            lob_write_chunk_size: config.lob_write_chunk_size,
        })
    }

    /// Give the session back
    pub fn into_session(self) -> S {
        self.session.into_inner()
    }

    async fn write_lob_column(
        &self,
        table_name: &str,
        schema: &TableSchema,
        column: &ColumnDescriptor,
        kind: LobKind,
        primary_key: &Value,
        data: &LobData,
    ) -> Result<()> {
        let stmt = sql::lob_locator_query(table_name, schema.primary_key_name(), column, primary_key);

        let mut session = self.session.lock().await;
        let locator = session
            .select_lob_locator(&stmt.sql, &stmt.binds, kind)
            .await?
            .ok_or_else(|| Error::RecordNotFound { sql: stmt.sql.clone() })?;

        let mut offset = 1u64;
        for chunk in lob_chunks(data, self.lob_write_chunk_size) {
            session.write_lob(&locator, offset, chunk.bytes).await?;
            offset += chunk.lob_length;
        }

        let new_length = data.lob_length();
        if locator.size() > new_length {
            session.trim_lob(&locator, new_length).await?;
        }

        tracing::debug!(
            table = table_name,
            column = column.name.as_str(),
            bytes = data.len(),
            "Wrote LOB content"
        );
        Ok(())
    }
}

impl<S: OracleSession> ConnectionAdapter for OracleEnhancedAdapter<S> {
    fn kind(&self) -> AdapterKind {
        self.kind
    }

    async fn insert_row(&self, schema: &TableSchema, record: &Record) -> Result<u64> {
        let attributes = persistable_attributes(schema, record, AttributeFilter::for_insert());
        let stmt = sql::insert_statement(schema, &attributes);
        tracing::trace!(sql = stmt.sql.as_str(), "Inserting row");
        self.session.lock().await.execute(&stmt.sql, &stmt.binds).await
    }

    async fn update_row(&self, schema: &TableSchema, record: &Record) -> Result<u64> {
        let primary_key = primary_key_value(schema.table_name(), schema, record.attributes())?;
        let attributes = persistable_attributes(schema, record, AttributeFilter::for_update());
        let Some(stmt) = sql::update_statement(schema, &attributes, primary_key) else {
            tracing::trace!(table = schema.table_name(), "No changed attributes, skipping update");
            return Ok(0);
        };
        tracing::trace!(sql = stmt.sql.as_str(), "Updating row");
        self.session.lock().await.execute(&stmt.sql, &stmt.binds).await
    }

    async fn write_lobs(
        &self,
        table_name: &str,
        schema: &TableSchema,
        attributes: &IndexMap<String, Value>,
        columns: &[ColumnDescriptor],
    ) -> Result<()> {
        let mut primary_key = None;

        for column in columns {
            let Some(kind) = column.lob_kind() else {
                tracing::trace!(column = column.name.as_str(), "Not a LOB column, skipping");
                continue;
            };
            let value = attributes.get(&column.name).unwrap_or(&NULL);
            let Some(data) = lob_content(schema, column, value)? else {
                tracing::trace!(column = column.name.as_str(), "Blank LOB value, nothing to write");
                continue;
            };
            data.check_kind(&column.name, kind)?;
            // only a LOB with content needs the row's locator
            let key = match primary_key {
                Some(key) => key,
                None => {
                    let key = primary_key_value(table_name, schema, attributes)?;
                    primary_key = Some(key);
                    key
                }
            };
            self.write_lob_column(table_name, schema, column, kind, key, &data)
                .await?;
        }
        Ok(())
    }
}

fn primary_key_value<'a>(
    table_name: &str,
    schema: &TableSchema,
    attributes: &'a IndexMap<String, Value>,
) -> Result<&'a Value> {
    attributes
        .get(schema.primary_key_name())
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::MissingPrimaryKey {
            table: table_name.to_string(),
        })
}

/// Content to write for one column, or `None` for NULL and empty values
///
/// Serialized attributes are dumped to JSON text first.
fn lob_content(schema: &TableSchema, column: &ColumnDescriptor, value: &Value) -> Result<Option<LobData>> {
    if value.is_blank() {
        return Ok(None);
    }

    let data = if schema.is_serialized(&column.name) {
        LobData::String(serialize_attribute(&column.name, value)?)
    } else {
        value.to_lob_data().ok_or_else(|| Error::LobTypeMismatch {
            column: column.name.clone(),
            expected: column
                .lob_kind()
                .map(|k| k.expected_content())
                .unwrap_or("LOB data"),
        })?
    };

    Ok(if data.is_empty() { None } else { Some(data) })
}

fn serialize_attribute(column: &str, value: &Value) -> Result<String> {
    let json = match value {
        Value::Json(j) => j.clone(),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Value::from(*f),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Date(d) => serde_json::Value::String(d.to_string()),
        Value::Null => serde_json::Value::Null,
        Value::Bytes(_) => {
            return Err(Error::DataConversion(format!(
                "binary value of serialized attribute {column} cannot be dumped"
            )))
        }
    };
    Ok(serde_json::to_string(&json)?)
}

struct LobChunk<'a> {
    bytes: &'a [u8],
    lob_length: u64,
}

/// Split LOB content into write chunks of at most `max_bytes` bytes
///
/// Character data is split on character boundaries so that each chunk's
/// offset advance can be counted in characters.
fn lob_chunks(data: &LobData, max_bytes: usize) -> Vec<LobChunk<'_>> {
    let max_bytes = max_bytes.max(1);
    match data {
        LobData::Bytes(b) => b
            .chunks(max_bytes)
            .map(|bytes| LobChunk {
                bytes,
                lob_length: bytes.len() as u64,
            })
            .collect(),
        LobData::String(s) => {
            let mut chunks = Vec::new();
            let mut rest = s.as_str();
            while !rest.is_empty() {
                let mut end = max_bytes.min(rest.len());
                while !rest.is_char_boundary(end) {
                    end -= 1;
                }
                if end == 0 {
                    end = rest.chars().next().map(char::len_utf8).unwrap_or(rest.len());
                }
                let (head, tail) = rest.split_at(end);
                chunks.push(LobChunk {
                    bytes: head.as_bytes(),
                    lob_length: head.chars().count() as u64,
                });
                rest = tail;
            }
            chunks
        }
    }
}
