//! Attribute lists for generated INSERT and UPDATE statements
//!
//! Virtual columns are computed by Oracle and reject explicit values, and
//! ignored columns are invisible to the model layer. Every column list the
//! adapter generates comes from [`persistable_attributes`], which drops both.

use crate::record::Record;
use crate::schema::{ColumnDescriptor, TableSchema};
use crate::value::Value;

/// Which attributes a statement writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeFilter {
    /// Include the primary key column
    pub include_primary_key: bool,
    /// Include read-only attributes
    pub include_readonly: bool,
    /// Only include attributes changed since load
    pub only_changed: bool,
}

impl AttributeFilter {
    /// Attributes written by an INSERT
    pub fn for_insert() -> Self {
        Self {
            include_primary_key: true,
            include_readonly: true,
            only_changed: false,
        }
    }

    /// Attributes written by a partial UPDATE
    pub fn for_update() -> Self {
        Self {
            include_primary_key: false,
            include_readonly: false,
            only_changed: true,
        }
    }
}

/// Column/value pairs of a record that a statement may write, in schema
/// column order
///
/// Virtual columns, ignored columns and attributes naming no column are
/// always excluded.
pub fn persistable_attributes<'s, 'r>(
    schema: &'s TableSchema,
    record: &'r Record,
    filter: AttributeFilter,
) -> Vec<(&'s ColumnDescriptor, &'r Value)> {
    schema
        .columns()
        .filter(|column| !column.is_virtual())
        .filter(|column| filter.include_primary_key || column.name != schema.primary_key_name())
        .filter(|column| filter.include_readonly || !schema.is_readonly(&column.name))
        .filter(|column| !filter.only_changed || record.is_changed(&column.name))
        .filter_map(|column| record.get(&column.name).map(|value| (column, value)))
        .collect()
}
