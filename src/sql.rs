//! SQL text for the primary row write and the LOB locator query
//!
//! Values are always bound (`:1`, `:2`, ...). LOB columns are written as
//! empty LOB literals by the primary write; their content follows through the
//! out-of-band LOB write once the row exists.

use std::fmt::Write as _;

use crate::schema::{ColumnDescriptor, TableSchema};
use crate::value::Value;

/// SQL text together with its positional bind values
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    /// SQL text with `:n` placeholders
    pub sql: String,
    /// Values for the placeholders, in order
    pub binds: Vec<Value>,
}

impl BoundStatement {
    fn new() -> Self {
        Self {
            sql: String::new(),
            binds: Vec::new(),
        }
    }

    /// Bind a value and return its placeholder
    fn bind(&mut self, value: Value) -> String {
        self.binds.push(value);
        format!(":{}", self.binds.len())
    }

    /// Placeholder or literal for a column value
    ///
    /// Non-NULL LOB values become empty LOB literals.
    fn column_value(&mut self, column: &ColumnDescriptor, value: &Value) -> String {
        match column.lob_kind() {
            Some(kind) if !value.is_null() => kind.empty_literal().to_string(),
            _ => self.bind(value.clone()),
        }
    }
}

/// Quote a column name
///
/// Simple lower-case identifiers are stored upper-case by Oracle, so they are
/// upper-cased before quoting; anything else is quoted verbatim.
pub fn quote_column_name(name: &str) -> String {
    if is_simple_identifier(name) {
        format!("\"{}\"", name.to_ascii_uppercase())
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Quote a table name, handling `owner.table` and `table@dblink` forms
pub fn quote_table_name(name: &str) -> String {
    let (name, dblink) = match name.split_once('@') {
        Some((name, link)) => (name, Some(link)),
        None => (name, None),
    };
    let mut quoted = name
        .split('.')
        .map(quote_column_name)
        .collect::<Vec<_>>()
        .join(".");
    if let Some(link) = dblink {
        quoted.push('@');
        quoted.push_str(link);
    }
    quoted
}

fn is_simple_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '$' | '#'))
}

/// Build the INSERT for a new row
///
/// With nothing to write, the primary key column takes its default so the
/// statement stays valid.
pub fn insert_statement(
    schema: &TableSchema,
    attributes: &[(&ColumnDescriptor, &Value)],
) -> BoundStatement {
    let mut stmt = BoundStatement::new();
    if attributes.is_empty() {
        let _ = write!(
            stmt.sql,
            "INSERT INTO {} ({}) VALUES (DEFAULT)",
            quote_table_name(schema.table_name()),
            quote_column_name(schema.primary_key_name())
        );
        return stmt;
    }

    let columns: Vec<String> = attributes
        .iter()
        .map(|(column, _)| quote_column_name(&column.name))
        .collect();
    let values: Vec<String> = attributes
        .iter()
        .map(|(column, value)| stmt.column_value(column, value))
        .collect();

    let _ = write!(
        stmt.sql,
        "INSERT INTO {} ({}) VALUES ({})",
        quote_table_name(schema.table_name()),
        columns.join(", "),
        values.join(", ")
    );
    stmt
}

/// Build the UPDATE for an existing row, or `None` when nothing changed
pub fn update_statement(
    schema: &TableSchema,
    attributes: &[(&ColumnDescriptor, &Value)],
    primary_key: &Value,
) -> Option<BoundStatement> {
    if attributes.is_empty() {
        return None;
    }

    let mut stmt = BoundStatement::new();
    let assignments: Vec<String> = attributes
        .iter()
        .map(|(column, value)| {
            format!(
                "{} = {}",
                quote_column_name(&column.name),
                stmt.column_value(column, value)
            )
        })
        .collect();
    let pk_placeholder = stmt.bind(primary_key.clone());

    let _ = write!(
        stmt.sql,
        "UPDATE {} SET {} WHERE {} = {}",
        quote_table_name(schema.table_name()),
        assignments.join(", "),
        quote_column_name(schema.primary_key_name()),
        pk_placeholder
    );
    Some(stmt)
}

/// Build the query that locks a row and selects one LOB locator
pub fn lob_locator_query(
    table_name: &str,
    primary_key_name: &str,
    column: &ColumnDescriptor,
    primary_key: &Value,
) -> BoundStatement {
    let mut stmt = BoundStatement::new();
    let pk_placeholder = stmt.bind(primary_key.clone());
    let _ = write!(
        stmt.sql,
        "SELECT {} FROM {} WHERE {} = {} FOR UPDATE",
        quote_column_name(&column.name),
        quote_table_name(table_name),
        quote_column_name(primary_key_name),
        pk_placeholder
    );
    stmt
}
