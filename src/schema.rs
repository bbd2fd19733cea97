//! Table and column metadata
//!
//! A [`ColumnDescriptor`] resolves everything the persistence layer needs to
//! know about a column exactly once, when the schema is loaded: the Rust-side
//! [`ColumnType`] used for typecasting, whether the column is a LOB (and of
//! which kind), and whether it is a virtual (computed) column that must never
//! appear in INSERT or UPDATE column lists.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{LobKind, OracleDate};
use crate::value::Value;

/// Rust-side type of a column, used to typecast assigned values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// VARCHAR2, CHAR, NVARCHAR2
    String,
    /// CLOB, NCLOB
    Text,
    /// NUMBER with zero scale
    Integer,
    /// NUMBER with scale or without precision
    Decimal,
    /// FLOAT, BINARY_FLOAT, BINARY_DOUBLE
    Float,
    /// NUMBER(1), emulated as boolean
    Boolean,
    /// DATE holding only a date
    Date,
    /// DATE or TIMESTAMP holding a date and a time
    DateTime,
    /// BLOB, RAW
    Binary,
}

impl ColumnType {
    /// Resolve the default type of a column from its Oracle SQL type
    pub fn from_sql_type(sql_type: &str) -> Self {
        let upper = sql_type.trim().to_ascii_uppercase();
        let (base, args) = match upper.find('(') {
            Some(pos) => (
                upper[..pos].trim(),
                upper[pos + 1..].trim_end_matches(')').trim(),
            ),
            None => (upper.as_str(), ""),
        };

        match base {
            "CLOB" | "NCLOB" | "LONG" => ColumnType::Text,
            "BLOB" | "RAW" | "LONG RAW" => ColumnType::Binary,
            "DATE" => ColumnType::DateTime,
            b if b.starts_with("TIMESTAMP") => ColumnType::DateTime,
            "FLOAT" | "BINARY_FLOAT" | "BINARY_DOUBLE" => ColumnType::Float,
            "INTEGER" | "INT" | "SMALLINT" => ColumnType::Integer,
            "NUMBER" => {
                let mut parts = args.split(',').map(str::trim);
                let precision = parts.next().filter(|p| !p.is_empty());
                let scale = parts.next();
                match (precision, scale) {
                    (Some("1"), None | Some("0")) => ColumnType::Boolean,
                    (Some(_), None | Some("0")) => ColumnType::Integer,
                    _ => ColumnType::Decimal,
                }
            }
            _ => ColumnType::String,
        }
    }

    /// Typecast an assigned value to this column type
    ///
    /// NULL passes through unchanged. Values that cannot be represented fail
    /// with [`Error::DataConversion`].
    pub fn cast(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }

        let fail = |v: &Value| Error::DataConversion(format!("cannot cast {v} to {self}"));

        match self {
            ColumnType::String | ColumnType::Text => match value {
                Value::String(_) | Value::Json(_) => Ok(value),
                Value::Bytes(b) => String::from_utf8(b.to_vec())
                    .map(Value::String)
                    .map_err(|e| Error::DataConversion(e.to_string())),
                other => Ok(Value::String(other.to_string())),
            },
            ColumnType::Integer => match &value {
                Value::Integer(_) => Ok(value),
                Value::Float(f) => Ok(Value::Integer(f.trunc() as i64)),
                Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| fail(&value)),
                _ => Err(fail(&value)),
            },
            ColumnType::Decimal | ColumnType::Float => match &value {
                Value::Float(_) => Ok(value),
                Value::Integer(i) => Ok(Value::Float(*i as f64)),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| fail(&value)),
                _ => Err(fail(&value)),
            },
            ColumnType::Boolean => match &value {
                Value::Boolean(_) => Ok(value),
                Value::Integer(i) => Ok(Value::Boolean(*i != 0)),
                Value::String(s) => match s.trim().to_ascii_uppercase().as_str() {
                    "Y" | "1" | "TRUE" => Ok(Value::Boolean(true)),
                    "N" | "0" | "FALSE" => Ok(Value::Boolean(false)),
                    _ => Err(fail(&value)),
                },
                _ => Err(fail(&value)),
            },
            ColumnType::Date => match &value {
                Value::Date(d) => Ok(Value::Date(d.truncate_time())),
                Value::String(s) => Ok(Value::Date(OracleDate::parse(s)?.truncate_time())),
                _ => Err(fail(&value)),
            },
            ColumnType::DateTime => match &value {
                Value::Date(_) => Ok(value),
                Value::String(s) => Ok(Value::Date(OracleDate::parse(s)?)),
                _ => Err(fail(&value)),
            },
            ColumnType::Binary => match value {
                Value::Bytes(_) => Ok(value),
                Value::String(s) => Ok(Value::Bytes(s.into_bytes().into())),
                other => Err(fail(&other)),
            },
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// Typed description of one table column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    /// Column name as used for attribute keys
    pub name: String,
    /// Oracle SQL type, e.g. `VARCHAR2(100)`
    pub sql_type: String,
    /// Rust-side type used for typecasting
    pub column_type: ColumnType,
    /// LOB kind, resolved from the SQL type
    lob: Option<LobKind>,
    /// Whether the column is virtual (computed by the database)
    virtual_column: bool,
}

impl ColumnDescriptor {
    /// Create a column descriptor from its name and SQL type
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let sql_type = sql_type.into();
        Self {
            name: name.into(),
            column_type: ColumnType::from_sql_type(&sql_type),
            lob: LobKind::from_sql_type(&sql_type),
            sql_type,
            virtual_column: false,
        }
    }

    /// Mark the column as virtual
    pub fn virtual_column(mut self) -> Self {
        self.virtual_column = true;
        self
    }

    /// Check if this is a LOB column
    pub fn is_lob(&self) -> bool {
        self.lob.is_some()
    }

    /// Get the LOB kind, if this is a LOB column
    pub fn lob_kind(&self) -> Option<LobKind> {
        self.lob
    }

    /// Check if this is a virtual column
    pub fn is_virtual(&self) -> bool {
        self.virtual_column
    }
}

/// Metadata for one table, as seen by one model class
#[derive(Debug, Clone)]
pub struct TableSchema {
    table_name: String,
    primary_key: String,
    columns: Vec<ColumnDescriptor>,
    ignored_columns: BTreeSet<String>,
    serialized_attributes: BTreeSet<String>,
    readonly_attributes: BTreeSet<String>,
    custom_create: bool,
    custom_update: bool,
    comment: Option<String>,
}

impl TableSchema {
    /// Create an empty schema for a table with an `id` primary key
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary_key: "id".to_string(),
            columns: Vec::new(),
            ignored_columns: BTreeSet::new(),
            serialized_attributes: BTreeSet::new(),
            readonly_attributes: BTreeSet::new(),
            custom_create: false,
            custom_update: false,
            comment: None,
        }
    }

    /// Set the primary key column
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    /// Add a column
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Declare an attribute whose content is persisted through serialization
    pub fn serialize(mut self, name: impl Into<String>) -> Self {
        self.serialized_attributes.insert(name.into());
        self
    }

    /// Declare an attribute that is never written by updates
    pub fn readonly(mut self, name: impl Into<String>) -> Self {
        self.readonly_attributes.insert(name.into());
        self
    }

    /// Route inserts through a custom create path
    pub fn custom_create(mut self, enabled: bool) -> Self {
        self.custom_create = enabled;
        self
    }

    /// Route updates through a custom update path
    pub fn custom_update(mut self, enabled: bool) -> Self {
        self.custom_update = enabled;
        self
    }

    /// Set the table comment
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Get the table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Get the primary key column name
    pub fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    /// Visible columns, in declaration order, excluding ignored ones
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| !self.ignored_columns.contains(&c.name))
    }

    /// Find a visible column by name
    pub fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns().find(|c| c.name == name)
    }

    /// Visible LOB columns
    pub fn lob_columns(&self) -> Vec<ColumnDescriptor> {
        self.columns().filter(|c| c.is_lob()).cloned().collect()
    }

    /// Visible virtual columns
    pub fn virtual_columns(&self) -> Vec<ColumnDescriptor> {
        self.columns().filter(|c| c.is_virtual()).cloned().collect()
    }

    /// Check if an attribute is persisted through serialization
    pub fn is_serialized(&self, name: &str) -> bool {
        self.serialized_attributes.contains(name)
    }

    /// Check if an attribute is read-only
    pub fn is_readonly(&self, name: &str) -> bool {
        self.readonly_attributes.contains(name)
    }

    /// Names of serialized attributes
    pub fn serialized_attribute_names(&self) -> &BTreeSet<String> {
        &self.serialized_attributes
    }

    /// Names of read-only attributes
    pub fn readonly_attribute_names(&self) -> &BTreeSet<String> {
        &self.readonly_attributes
    }

    /// Check if inserts go through a custom create path
    pub fn uses_custom_create_path(&self) -> bool {
        self.custom_create
    }

    /// Check if updates go through a custom update path
    pub fn uses_custom_update_path(&self) -> bool {
        self.custom_update
    }

    /// Get the table comment
    pub fn table_comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Hide columns from every column list of this table
    pub fn ignore_columns<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_columns.extend(names.into_iter().map(Into::into));
    }

    /// Override the Rust-side type of the named columns
    ///
    /// The LOB flag is left alone: it follows the SQL type.
    pub fn set_type_for_columns<I, S>(&mut self, column_type: ColumnType, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            let column = self
                .columns
                .iter_mut()
                .find(|c| c.name == name)
                .ok_or_else(|| Error::UnknownAttribute {
                    table: self.table_name.clone(),
                    attribute: name.to_string(),
                })?;
            column.column_type = column_type;
        }
        Ok(())
    }

    /// Typecast a value assigned to the named attribute
    pub fn typecast(&self, name: &str, value: Value) -> Result<Value> {
        let column = self.find_column(name).ok_or_else(|| Error::UnknownAttribute {
            table: self.table_name.clone(),
            attribute: name.to_string(),
        })?;
        column.column_type.cast(value)
    }

    /// Check the schema for inconsistencies
    pub fn validate(&self) -> Result<()> {
        let malformed = |msg: String| Error::Configuration(format!("table {}: {}", self.table_name, msg));

        if self.table_name.trim().is_empty() {
            return Err(Error::Configuration("table name is empty".to_string()));
        }

        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(malformed(format!("duplicate column {}", column.name)));
            }
            if column.is_lob() && column.is_virtual() {
                return Err(malformed(format!("LOB column {} cannot be virtual", column.name)));
            }
        }

        if !seen.contains(self.primary_key.as_str()) {
            return Err(malformed(format!("primary key column {} not found", self.primary_key)));
        }

        for name in self.serialized_attributes.iter().chain(&self.readonly_attributes) {
            if !seen.contains(name.as_str()) {
                return Err(malformed(format!("attribute {} names no column", name)));
            }
        }

        Ok(())
    }
}
