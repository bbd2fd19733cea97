//! LOB write-back coordination
//!
//! Oracle LOB content does not travel with the INSERT or UPDATE of its row.
//! The primary write stores empty LOBs; afterwards each LOB column whose
//! content may have changed is selected for update and written through its
//! locator.
//!
//! The coordinator splits this into two steps wired around the primary write:
//!
//! 1. [`capture_changed_lobs`] runs before the write and snapshots which LOB
//!    columns changed. It has to run first because the write resets the
//!    record's change tracking.
//! 2. [`flush_changed_lobs`] runs after the write and consumes the snapshot,
//!    handing it to the adapter's [`write_lobs`](ConnectionAdapter::write_lobs).
//!    With no snapshot (an insert, which has no before-update phase) every
//!    LOB column of the table is flushed.
//!
//! The two writes are not atomic at this layer. If the flush fails the row
//! stays committed without its LOB content and the error propagates to the
//! caller, who may retry the flush alone.

use crate::adapter::{AdapterKind, ConnectionAdapter};
use crate::error::Result;
use crate::record::Record;
use crate::schema::{ColumnDescriptor, TableSchema};

/// Why a flush wrote nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The table persists through a custom create or update path
    CustomPersistence,
    /// The active adapter is the emulation adapter
    EmulationAdapter,
}

/// Result of a flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobFlush {
    /// `write_lobs` was called with these columns (none when nothing changed)
    Written(Vec<String>),
    /// No adapter call was made
    Skipped(SkipReason),
}

impl LobFlush {
    /// Check if the flush was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, LobFlush::Skipped(_))
    }
}

/// LOB columns of a record whose content may have changed
///
/// A LOB column is included when it is a serialized attribute (serialization
/// can change content the change tracker never sees), or when it changed and
/// is not read-only.
pub fn changed_lob_columns(schema: &TableSchema, record: &Record) -> Vec<ColumnDescriptor> {
    schema
        .lob_columns()
        .into_iter()
        .filter(|column| {
            schema.is_serialized(&column.name)
                || (record.is_changed(&column.name) && !schema.is_readonly(&column.name))
        })
        .collect()
}

/// Snapshot the changed LOB columns onto the record
///
/// Must run before the primary write of the save.
pub fn capture_changed_lobs(schema: &TableSchema, record: &mut Record) {
    let columns = changed_lob_columns(schema, record);
    tracing::debug!(
        table = schema.table_name(),
        changed_lobs = columns.len(),
        "Captured changed LOB columns"
    );
    record.set_changed_lob_columns(columns);
}

/// Write the snapshotted LOB columns back through the adapter
///
/// Must run after the primary write of the save has completed. The snapshot
/// is consumed whether or not anything is written. Adapter errors propagate
/// unchanged; nothing is retried.
pub async fn flush_changed_lobs<A>(
    adapter: &A,
    schema: &TableSchema,
    record: &mut Record,
) -> Result<LobFlush>
where
    A: ConnectionAdapter,
{
    let captured = record.take_changed_lob_columns();

    if schema.uses_custom_create_path() || schema.uses_custom_update_path() {
        tracing::debug!(table = schema.table_name(), "Custom persistence path, skipping LOB flush");
        return Ok(LobFlush::Skipped(SkipReason::CustomPersistence));
    }

    if adapter.kind() == AdapterKind::Emulation {
        tracing::debug!(table = schema.table_name(), "Emulation adapter, skipping LOB flush");
        return Ok(LobFlush::Skipped(SkipReason::EmulationAdapter));
    }

    let columns = match captured {
        Some(columns) => columns,
        None => {
            tracing::debug!(
                table = schema.table_name(),
                "No changed LOB snapshot, flushing all LOB columns"
            );
            schema.lob_columns()
        }
    };

    if columns.is_empty() {
        tracing::trace!(table = schema.table_name(), "No LOB columns to flush");
        return Ok(LobFlush::Written(Vec::new()));
    }

    adapter
        .write_lobs(schema.table_name(), schema, record.attributes(), &columns)
        .await?;

    Ok(LobFlush::Written(
        columns.into_iter().map(|c| c.name).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn articles() -> TableSchema {
        TableSchema::new("articles")
            .column(ColumnDescriptor::new("id", "NUMBER(38,0)"))
            .column(ColumnDescriptor::new("title", "VARCHAR2(200)"))
            .column(ColumnDescriptor::new("body", "CLOB"))
            .column(ColumnDescriptor::new("summary", "CLOB"))
            .column(ColumnDescriptor::new("thumbnail", "BLOB"))
    }

    fn loaded() -> Record {
        Record::loaded(
            "articles",
            [
                ("id", Value::Integer(1)),
                ("title", Value::from("First")),
                ("body", Value::from("old body")),
                ("summary", Value::from("old summary")),
                ("thumbnail", Value::Null),
            ],
        )
    }

    fn names(columns: &[ColumnDescriptor]) -> Vec<&str> {
        columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_no_lob_columns_yields_empty_set() {
        let schema = TableSchema::new("tags")
            .column(ColumnDescriptor::new("id", "NUMBER(38,0)"))
            .column(ColumnDescriptor::new("name", "VARCHAR2(40)"));
        let mut record = Record::loaded("tags", [("id", Value::Integer(1))]);
        record.set("name", "rust");
        assert!(changed_lob_columns(&schema, &record).is_empty());
    }

    #[test]
    fn test_only_changed_lob_columns() {
        let mut record = loaded();
        record.set("title", "Second");
        record.set("summary", "new summary");
        assert_eq!(names(&changed_lob_columns(&articles(), &record)), vec!["summary"]);
    }

    #[test]
    fn test_serialized_lob_always_included() {
        let schema = articles().serialize("body");
        let record = loaded();
        assert_eq!(names(&changed_lob_columns(&schema, &record)), vec!["body"]);
    }

    #[test]
    fn test_readonly_lob_excluded_even_when_changed() {
        let schema = articles().readonly("summary");
        let mut record = loaded();
        record.set("summary", "new summary");
        record.set("body", "new body");
        assert_eq!(names(&changed_lob_columns(&schema, &record)), vec!["body"]);
    }

    #[test]
    fn test_capture_stores_snapshot_on_record() {
        let mut record = loaded();
        record.set("thumbnail", vec![0xFFu8, 0xD8]);
        capture_changed_lobs(&articles(), &mut record);
        let snapshot = record.changed_lob_columns().unwrap();
        assert_eq!(names(snapshot), vec!["thumbnail"]);
    }

    #[test]
    fn test_snapshot_survives_change_reset() {
        let mut record = loaded();
        record.set("body", "new body");
        capture_changed_lobs(&articles(), &mut record);
        record.changes_applied();
        assert_eq!(names(record.changed_lob_columns().unwrap()), vec!["body"]);
    }
}
