//! In-memory rows with change tracking
//!
//! A [`Record`] holds the attribute values of one row of one table, remembers
//! which attributes were assigned since the row was loaded, and carries the
//! transient changed-LOB snapshot owned by the save currently in flight.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::Result;
use crate::schema::{ColumnDescriptor, TableSchema};
use crate::value::Value;

/// One row of a table
#[derive(Debug, Clone)]
pub struct Record {
    table_name: String,
    attributes: IndexMap<String, Value>,
    changed: BTreeSet<String>,
    new_record: bool,
    changed_lob_columns: Option<Vec<ColumnDescriptor>>,
}

impl Record {
    /// Create a record that has not been inserted yet
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            attributes: IndexMap::new(),
            changed: BTreeSet::new(),
            new_record: true,
            changed_lob_columns: None,
        }
    }

    /// Create a record for a row loaded from the database
    ///
    /// No attribute is considered changed.
    pub fn loaded<I, K>(table_name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            table_name: table_name.into(),
            attributes: attributes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            changed: BTreeSet::new(),
            new_record: false,
            changed_lob_columns: None,
        }
    }

    /// Get the table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Check if the record has not been inserted yet
    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    /// Get an attribute value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// All attribute values, in assignment order
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// Assign an attribute without typecasting
    ///
    /// The attribute is flagged as changed unless the new value equals the
    /// current one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if self.attributes.get(&name) != Some(&value) {
            self.changed.insert(name.clone());
        }
        self.attributes.insert(name, value);
    }

    /// Typecast a value through the table schema and assign it
    pub fn write_attribute(
        &mut self,
        schema: &TableSchema,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = schema.typecast(name, value.into())?;
        self.set(name, value);
        Ok(())
    }

    /// Check if an attribute changed since load
    pub fn is_changed(&self, name: &str) -> bool {
        self.changed.contains(name)
    }

    /// Check if any attribute changed since load
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Names of attributes changed since load
    pub fn changed_attributes(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(String::as_str)
    }

    /// Reset change tracking after a successful write and mark the record
    /// as persisted
    pub fn changes_applied(&mut self) {
        self.changed.clear();
        self.new_record = false;
    }

    /// Store the changed-LOB snapshot for the save in flight
    pub(crate) fn set_changed_lob_columns(&mut self, columns: Vec<ColumnDescriptor>) {
        self.changed_lob_columns = Some(columns);
    }

    /// Take the changed-LOB snapshot, leaving none behind
    pub(crate) fn take_changed_lob_columns(&mut self) -> Option<Vec<ColumnDescriptor>> {
        self.changed_lob_columns.take()
    }

    /// Changed-LOB snapshot of the save in flight, if one was captured
    pub fn changed_lob_columns(&self) -> Option<&[ColumnDescriptor]> {
        self.changed_lob_columns.as_deref()
    }
}
