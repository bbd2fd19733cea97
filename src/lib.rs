#![warn(missing_docs)]

//! # oracle-enhanced
//!
//! Oracle-specific persistence for model records: large-object (LOB)
//! write-back after save, typed table metadata, typecast declarations and
//! virtual-column filtering for generated column lists.
//!
//! Oracle LOB content is not written together with its row. The row write
//! stores `EMPTY_CLOB()` / `EMPTY_BLOB()`, and the content follows through the
//! LOB locator once the row exists. This crate coordinates that second step:
//! it snapshots which LOB columns changed before the row write, and hands
//! exactly those columns to the adapter after the row write completes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oracle_enhanced::{
//!     AdapterConfig, ColumnDescriptor, OracleEnhancedAdapter, OracleSession, Record,
//!     SavePipeline, SchemaCache, TableSchema,
//! };
//!
//! # async fn example<S: OracleSession>(session: S) -> oracle_enhanced::Result<()> {
//! let mut catalog = SchemaCache::new();
//! catalog.register(
//!     TableSchema::new("documents")
//!         .column(ColumnDescriptor::new("id", "NUMBER(38,0)"))
//!         .column(ColumnDescriptor::new("title", "VARCHAR2(200)"))
//!         .column(ColumnDescriptor::new("content", "CLOB")),
//! )?;
//!
//! let config = AdapterConfig::new();
//! let host_version = config.host_version;
//! let adapter = OracleEnhancedAdapter::establish(config, session)?;
//! let pipeline = SavePipeline::new(&adapter, &catalog, host_version);
//!
//! let mut doc = Record::new("documents");
//! doc.set("id", 1);
//! doc.set("title", "Design notes");
//! doc.set("content", "A very long text ...");
//!
//! // INSERT with EMPTY_CLOB(), then the content is written through the locator
//! let outcome = pipeline.save(&mut doc).await?;
//! assert_eq!(outcome.flushed_columns, vec!["content"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Which LOB columns are written back
//!
//! On update, a LOB column is written back when it is a serialized attribute,
//! or when it changed and is not read-only. On insert every LOB column is
//! written back (blank values are skipped by the adapter). Nothing is written
//! when the table uses a custom create or update path, or when the adapter
//! runs in emulation mode.
//!
//! ## Schema declarations
//!
//! ```rust
//! use oracle_enhanced::{ColumnDescriptor, SchemaCache, SchemaCatalog, TableSchema};
//!
//! let mut catalog = SchemaCache::new();
//! catalog.register(
//!     TableSchema::new("employees")
//!         .column(ColumnDescriptor::new("id", "NUMBER(38,0)"))
//!         .column(ColumnDescriptor::new("level_code", "NUMBER(1)"))
//!         .column(ColumnDescriptor::new("legacy_flag", "CHAR(1)"))
//!         .comment("Staff records"),
//! )?;
//!
//! // NUMBER(1) would be a boolean; keep it numeric
//! catalog.set_integer_columns("employees", ["level_code"])?;
//! catalog.ignore_table_columns("employees", ["legacy_flag"])?;
//!
//! let schema = catalog.schema("employees")?;
//! assert!(schema.find_column("legacy_flag").is_none());
//! assert_eq!(catalog.table_comment("employees")?.as_deref(), Some("Staff records"));
//! # Ok::<(), oracle_enhanced::Error>(())
//! ```

pub mod adapter;
pub mod attributes;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod lob_writeback;
pub mod record;
pub mod schema;
pub mod schema_cache;
pub mod sql;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use adapter::{AdapterKind, ConnectionAdapter, OracleEnhancedAdapter, OracleSession};
pub use attributes::{persistable_attributes, AttributeFilter};
pub use config::{AdapterConfig, HostVersion, DEFAULT_LOB_WRITE_CHUNK_SIZE};
pub use error::{Error, Result};
pub use lifecycle::{AfterHook, HookStrategy, SaveOutcome, SavePipeline, SaveState, WriteKind};
pub use lob_writeback::{capture_changed_lobs, changed_lob_columns, flush_changed_lobs, LobFlush, SkipReason};
pub use record::Record;
pub use schema::{ColumnDescriptor, ColumnType, TableSchema};
pub use schema_cache::{SchemaCache, SchemaCatalog};
pub use types::{LobData, LobKind, LobLocator, OracleDate};
pub use value::Value;

// Re-export serde_json for users working with serialized attributes
pub use serde_json;
