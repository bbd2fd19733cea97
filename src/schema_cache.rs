//! Schema catalog
//!
//! The persistence layer never probes the database for column metadata while
//! saving. Schemas are registered (and validated) once, then handed out as
//! shared snapshots. Declarations that tweak a table after registration, such
//! as ignored columns or typecast overrides, copy-on-write the snapshot so
//! saves already in flight keep the schema they started with.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::schema::{ColumnDescriptor, ColumnType, TableSchema};

/// Source of table metadata for the save lifecycle
pub trait SchemaCatalog {
    /// Look up the schema of a table
    ///
    /// Fails with a configuration error when the table is unknown or its
    /// metadata is unusable.
    fn schema(&self, table_name: &str) -> Result<Arc<TableSchema>>;
}

/// In-memory schema catalog keyed by table name (case-insensitive)
///
/// # Example
///
/// ```rust
/// use oracle_enhanced::{ColumnDescriptor, SchemaCache, SchemaCatalog, TableSchema};
///
/// let mut cache = SchemaCache::new();
/// cache.register(
///     TableSchema::new("documents")
///         .column(ColumnDescriptor::new("id", "NUMBER(38,0)"))
///         .column(ColumnDescriptor::new("content", "CLOB")),
/// )?;
///
/// let schema = cache.schema("DOCUMENTS")?;
/// assert_eq!(schema.lob_columns().len(), 1);
/// # Ok::<(), oracle_enhanced::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: IndexMap<String, Arc<TableSchema>>,
}

impl SchemaCache {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table schema, replacing any previous one for the table
    pub fn register(&mut self, schema: TableSchema) -> Result<()> {
        schema.validate()?;
        let key = cache_key(schema.table_name());
        tracing::debug!(
            table = schema.table_name(),
            lob_columns = schema.lob_columns().len(),
            virtual_columns = schema.virtual_columns().len(),
            "Registered table schema"
        );
        self.tables.insert(key, Arc::new(schema));
        Ok(())
    }

    /// Number of registered tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no table is registered
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Forget a table
    pub fn remove(&mut self, table_name: &str) -> Option<Arc<TableSchema>> {
        self.tables.shift_remove(&cache_key(table_name))
    }

    /// Specify table columns which should be ignored by the model layer
    pub fn ignore_table_columns<I, S>(&mut self, table_name: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = self.schema_mut(table_name)?;
        schema.ignore_columns(names);
        Ok(())
    }

    /// Specify which table columns should be typecast to the given type
    pub fn set_type_for_columns<I, S>(
        &mut self,
        table_name: &str,
        column_type: ColumnType,
        names: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schema = self.schema_mut(table_name)?;
        schema.set_type_for_columns(column_type, names)
    }

    /// Typecast the named columns to dates (without time)
    pub fn set_date_columns<I, S>(&mut self, table_name: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_type_for_columns(table_name, ColumnType::Date, names)
    }

    /// Typecast the named columns to date-times
    pub fn set_datetime_columns<I, S>(&mut self, table_name: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_type_for_columns(table_name, ColumnType::DateTime, names)
    }

    /// Typecast the named columns to booleans
    pub fn set_boolean_columns<I, S>(&mut self, table_name: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_type_for_columns(table_name, ColumnType::Boolean, names)
    }

    /// Typecast the named columns to integers
    ///
    /// Useful to force a NUMBER(1) column to integer instead of boolean.
    pub fn set_integer_columns<I, S>(&mut self, table_name: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_type_for_columns(table_name, ColumnType::Integer, names)
    }

    /// Typecast the named columns to strings
    pub fn set_string_columns<I, S>(&mut self, table_name: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_type_for_columns(table_name, ColumnType::String, names)
    }

    /// Get the table comment
    pub fn table_comment(&self, table_name: &str) -> Result<Option<String>> {
        Ok(self.schema(table_name)?.table_comment().map(str::to_string))
    }

    /// LOB columns of a table
    pub fn lob_columns(&self, table_name: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.schema(table_name)?.lob_columns())
    }

    /// Virtual columns of a table
    pub fn virtual_columns(&self, table_name: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.schema(table_name)?.virtual_columns())
    }

    fn schema_mut(&mut self, table_name: &str) -> Result<&mut TableSchema> {
        let entry = self
            .tables
            .get_mut(&cache_key(table_name))
            .ok_or_else(|| Error::UnknownTable(table_name.to_string()))?;
        Ok(Arc::make_mut(entry))
    }
}

impl SchemaCatalog for SchemaCache {
    fn schema(&self, table_name: &str) -> Result<Arc<TableSchema>> {
        self.tables
            .get(&cache_key(table_name))
            .cloned()
            .ok_or_else(|| Error::UnknownTable(table_name.to_string()))
    }
}

fn cache_key(table_name: &str) -> String {
    table_name.trim().to_ascii_lowercase()
}
