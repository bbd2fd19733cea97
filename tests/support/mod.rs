//! Shared fakes for integration tests
//!
//! `FakeSession` stands in for a live Oracle connection: it records every
//! call and keeps LOB content per locator query. `RecordingAdapter` stands in
//! for a whole adapter and records the order of primary writes and LOB
//! flushes.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use indexmap::IndexMap;
use oracle_enhanced::{
    AdapterKind, ColumnDescriptor, ConnectionAdapter, Error, LobKind, LobLocator, OracleSession,
    Record, Result, TableSchema, Value,
};

// =============================================================================
// Fake Oracle session
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    Execute { sql: String, binds: Vec<Value> },
    SelectLocator { sql: String, binds: Vec<Value> },
    WriteLob { sql: String, offset: u64, len: usize },
    TrimLob { sql: String, new_size: u64 },
}

#[derive(Debug, Clone)]
enum StoredLob {
    Text(Vec<char>),
    Binary(Vec<u8>),
}

impl StoredLob {
    fn empty(kind: LobKind) -> Self {
        if kind.is_binary() {
            StoredLob::Binary(Vec::new())
        } else {
            StoredLob::Text(Vec::new())
        }
    }

    fn len(&self) -> u64 {
        match self {
            StoredLob::Text(c) => c.len() as u64,
            StoredLob::Binary(b) => b.len() as u64,
        }
    }

    fn kind(&self) -> LobKind {
        match self {
            StoredLob::Text(_) => LobKind::Clob,
            StoredLob::Binary(_) => LobKind::Blob,
        }
    }

    fn write(&mut self, offset: u64, data: &[u8]) {
        let start = (offset - 1) as usize;
        match self {
            StoredLob::Text(chars) => {
                let incoming: Vec<char> = String::from_utf8_lossy(data).chars().collect();
                splice(chars, start, &incoming);
            }
            StoredLob::Binary(bytes) => splice(bytes, start, data),
        }
    }

    fn trim(&mut self, new_size: u64) {
        match self {
            StoredLob::Text(c) => c.truncate(new_size as usize),
            StoredLob::Binary(b) => b.truncate(new_size as usize),
        }
    }
}

fn splice<T: Clone + Default>(target: &mut Vec<T>, start: usize, data: &[T]) {
    if target.len() < start + data.len() {
        target.resize(start + data.len(), T::default());
    }
    target[start..start + data.len()].clone_from_slice(data);
}

#[derive(Debug, Default)]
struct SessionState {
    calls: Vec<SessionCall>,
    lobs: IndexMap<String, StoredLob>,
    missing_rows: bool,
    fail_lob_writes: Option<u32>,
}

/// In-memory Oracle session
///
/// LOBs are keyed by the SQL text of their locator query, which names the
/// table, the column and the primary key column.
#[derive(Debug, Clone, Default)]
pub struct FakeSession {
    state: Arc<Mutex<SessionState>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SessionCall::Execute { sql, .. } => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn lob_writes(&self) -> Vec<(u64, usize)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SessionCall::WriteLob { offset, len, .. } => Some((offset, len)),
                _ => None,
            })
            .collect()
    }

    /// Store existing CLOB content, as if the row had been written earlier
    pub fn seed_clob(&self, locator_sql: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .lobs
            .insert(locator_sql.to_string(), StoredLob::Text(content.chars().collect()));
    }

    pub fn clob(&self, locator_sql: &str) -> Option<String> {
        match self.state.lock().unwrap().lobs.get(locator_sql) {
            Some(StoredLob::Text(chars)) => Some(chars.iter().collect()),
            _ => None,
        }
    }

    pub fn blob(&self, locator_sql: &str) -> Option<Vec<u8>> {
        match self.state.lock().unwrap().lobs.get(locator_sql) {
            Some(StoredLob::Binary(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Make every locator query return no row
    pub fn set_missing_rows(&self, missing: bool) {
        self.state.lock().unwrap().missing_rows = missing;
    }

    /// Make every LOB write fail with the given ORA code
    pub fn fail_lob_writes(&self, code: u32) {
        self.state.lock().unwrap().fail_lob_writes = Some(code);
    }
}

fn locator_key(locator: &LobLocator) -> String {
    String::from_utf8_lossy(locator.locator_bytes()).into_owned()
}

impl OracleSession for FakeSession {
    async fn execute(&mut self, sql: &str, binds: &[Value]) -> Result<u64> {
        self.state.lock().unwrap().calls.push(SessionCall::Execute {
            sql: sql.to_string(),
            binds: binds.to_vec(),
        });
        Ok(1)
    }

    async fn select_lob_locator(
        &mut self,
        sql: &str,
        binds: &[Value],
        kind: LobKind,
    ) -> Result<Option<LobLocator>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(SessionCall::SelectLocator {
            sql: sql.to_string(),
            binds: binds.to_vec(),
        });
        if state.missing_rows {
            return Ok(None);
        }
        let lob = state
            .lobs
            .entry(sql.to_string())
            .or_insert_with(|| StoredLob::empty(kind));
        Ok(Some(LobLocator::new(
            Bytes::from(sql.to_string()),
            lob.len(),
            lob.kind(),
        )))
    }

    async fn write_lob(&mut self, locator: &LobLocator, offset: u64, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = locator_key(locator);
        state.calls.push(SessionCall::WriteLob {
            sql: key.clone(),
            offset,
            len: data.len(),
        });
        if let Some(code) = state.fail_lob_writes {
            return Err(Error::oracle(code, "LOB write failed"));
        }
        match state.lobs.get_mut(&key) {
            Some(lob) => {
                lob.write(offset, data);
                Ok(())
            }
            None => Err(Error::oracle(22275, "invalid LOB locator specified")),
        }
    }

    async fn trim_lob(&mut self, locator: &LobLocator, new_size: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = locator_key(locator);
        state.calls.push(SessionCall::TrimLob {
            sql: key.clone(),
            new_size,
        });
        match state.lobs.get_mut(&key) {
            Some(lob) => {
                lob.trim(new_size);
                Ok(())
            }
            None => Err(Error::oracle(22275, "invalid LOB locator specified")),
        }
    }
}

// =============================================================================
// Recording adapter
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum AdapterCall {
    Insert {
        table: String,
    },
    Update {
        table: String,
    },
    WriteLobs {
        table: String,
        columns: Vec<String>,
        attributes: IndexMap<String, Value>,
    },
}

/// Adapter that only records what it was asked to do
#[derive(Debug)]
pub struct RecordingAdapter {
    kind: AdapterKind,
    calls: Mutex<Vec<AdapterCall>>,
    fail_write_lobs: bool,
}

impl RecordingAdapter {
    pub fn enhanced() -> Self {
        Self {
            kind: AdapterKind::Enhanced,
            calls: Mutex::new(Vec::new()),
            fail_write_lobs: false,
        }
    }

    pub fn emulation() -> Self {
        Self {
            kind: AdapterKind::Emulation,
            ..Self::enhanced()
        }
    }

    pub fn failing_write_lobs() -> Self {
        Self {
            fail_write_lobs: true,
            ..Self::enhanced()
        }
    }

    pub fn calls(&self) -> Vec<AdapterCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_lobs_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AdapterCall::WriteLobs { columns, .. } => Some(columns),
                _ => None,
            })
            .collect()
    }
}

impl ConnectionAdapter for RecordingAdapter {
    fn kind(&self) -> AdapterKind {
        self.kind
    }

    async fn insert_row(&self, schema: &TableSchema, _record: &Record) -> Result<u64> {
        self.calls.lock().unwrap().push(AdapterCall::Insert {
            table: schema.table_name().to_string(),
        });
        Ok(1)
    }

    async fn update_row(&self, schema: &TableSchema, _record: &Record) -> Result<u64> {
        self.calls.lock().unwrap().push(AdapterCall::Update {
            table: schema.table_name().to_string(),
        });
        Ok(1)
    }

    async fn write_lobs(
        &self,
        table_name: &str,
        _schema: &TableSchema,
        attributes: &IndexMap<String, Value>,
        columns: &[ColumnDescriptor],
    ) -> Result<()> {
        self.calls.lock().unwrap().push(AdapterCall::WriteLobs {
            table: table_name.to_string(),
            columns: columns.iter().map(|c| c.name.clone()).collect(),
            attributes: attributes.clone(),
        });
        if self.fail_write_lobs {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset during LOB write",
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Schemas
// =============================================================================

/// `documents(id, title, body CLOB, attachment BLOB, title_upper virtual)`
pub fn documents_schema() -> TableSchema {
    TableSchema::new("documents")
        .column(ColumnDescriptor::new("id", "NUMBER(38,0)"))
        .column(ColumnDescriptor::new("title", "VARCHAR2(200)"))
        .column(ColumnDescriptor::new("body", "CLOB"))
        .column(ColumnDescriptor::new("attachment", "BLOB"))
        .column(ColumnDescriptor::new("title_upper", "VARCHAR2(200)").virtual_column())
}

/// `tags(id, name)`, no LOB columns
pub fn tags_schema() -> TableSchema {
    TableSchema::new("tags")
        .column(ColumnDescriptor::new("id", "NUMBER(38,0)"))
        .column(ColumnDescriptor::new("name", "VARCHAR2(40)"))
}

/// A persisted `documents` row with both LOBs holding content
pub fn loaded_document() -> Record {
    Record::loaded(
        "documents",
        [
            ("id", Value::Integer(10)),
            ("title", Value::from("Spec")),
            ("body", Value::from("first draft")),
            ("attachment", Value::from(vec![1u8, 2, 3])),
        ],
    )
}

pub const BODY_LOCATOR_SQL: &str =
    "SELECT \"BODY\" FROM \"DOCUMENTS\" WHERE \"ID\" = :1 FOR UPDATE";
pub const ATTACHMENT_LOCATOR_SQL: &str =
    "SELECT \"ATTACHMENT\" FROM \"DOCUMENTS\" WHERE \"ID\" = :1 FOR UPDATE";
