//! Schema reflection over `DESCRIBE` output.
//!
//! Hive has no structured catalog we can query reliably, so reflection runs
//! `DESCRIBE <table>` and reads the three-column text result:
//!
//! ```text
//! col_name                  data_type      comment
//! a                         int
//! b                         array<int>
//!
//! # Partition Information
//! # col_name                data_type      comment
//!
//! p                         string
//! ```
//!
//! Rows before the partition marker are columns; names after it are
//! partition columns. Nothing is cached: every call issues its own DESCRIBE.
use std::sync::LazyLock;

use regex::Regex;

use super::connection::{Connection, Row};
use crate::ast::preparer::IdentifierPreparer;
use crate::ast::types::TableName;
use crate::diagnostics::DiagnosticsSink;
use crate::error::{DialectError, Result};
use crate::types::{registry, ArrayType, SqlType};

pub const PARTITION_MARKER: &str = "# Partition Information";
pub const HEADER_MARKER: &str = "# col_name";

static TYPE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+").expect("static regex is valid"));
static ARRAY_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^array\s*<(.+)>$").expect("static regex is valid"));
static DECIMAL_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^decimal\s*\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").expect("static regex is valid")
});
static DOES_NOT_EXIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Table .* does not exist").expect("static regex is valid"));

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionInfo {
    pub column_names: Vec<String>,
}

impl PartitionInfo {
    pub fn is_empty(&self) -> bool {
        self.column_names.is_empty()
    }
}

/// Everything one DESCRIBE tells us about a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDescription {
    pub columns: Vec<ColumnDescriptor>,
    pub partitions: PartitionInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub column_names: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    pub name: Option<String>,
    pub constrained_columns: Vec<String>,
    pub referred_table: TableName,
    pub referred_columns: Vec<String>,
}

/// Run `DESCRIBE` for `table`, turning both of Hive's "missing table"
/// signals into [`DialectError::NoSuchTable`].
pub fn describe_table<C: Connection + ?Sized>(conn: &C, table: &TableName) -> Result<Vec<Row>> {
    // DESCRIBE wants the name unescaped.
    let full_table = table.full_name();
    let sql = format!("DESCRIBE {}", full_table);
    tracing::debug!(table = %full_table, "describing table");

    let rows = match conn.execute(&sql) {
        Ok(rows) => rows,
        Err(DialectError::Operational(message)) => {
            let pattern = format!(
                r"(?s)SemanticException.*Table not found {}(?:\W|$)",
                regex::escape(&full_table)
            );
            let not_found = Regex::new(&pattern)
                .map_err(|e| DialectError::InternalConsistency(e.to_string()))?;
            if not_found.is_match(&message) {
                return Err(DialectError::NoSuchTable(full_table));
            }
            return Err(DialectError::Operational(message));
        }
        Err(other) => return Err(other),
    };

    // DESCRIBE some_schema.does_not_exist succeeds with a single message row.
    if rows.len() == 1 {
        if let Some(first) = rows[0].text(0) {
            if DOES_NOT_EXIST.is_match(first.trim()) {
                return Err(DialectError::NoSuchTable(full_table));
            }
        }
    }

    Ok(rows)
}

fn cell(row: &Row, index: usize) -> Option<String> {
    row.text(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trimmed `(col_name, data_type, comment)` triples with blank rows and
/// header rows removed.
fn clean_rows(rows: &[Row]) -> Vec<(String, Option<String>, Option<String>)> {
    rows.iter()
        .filter_map(|row| {
            let name = cell(row, 0)?;
            if name == HEADER_MARKER {
                return None;
            }
            Some((name, cell(row, 1), cell(row, 2)))
        })
        .collect()
}

/// Parse DESCRIBE rows into columns and partition columns.
pub fn parse_describe(
    rows: &[Row],
    sink: &dyn DiagnosticsSink,
    array_as_tuple: bool,
) -> TableDescription {
    let mut description = TableDescription::default();
    let mut in_partitions = false;

    for (name, type_text, comment) in clean_rows(rows) {
        if in_partitions {
            description.partitions.column_names.push(name);
            continue;
        }
        if name == PARTITION_MARKER {
            in_partitions = true;
            continue;
        }
        let type_text = type_text.unwrap_or_default();
        let sql_type = resolve_column_type(&type_text, &name, sink, array_as_tuple);
        description.columns.push(ColumnDescriptor {
            name,
            sql_type,
            nullable: true,
            default: None,
            comment,
        });
    }

    description
}

/// Resolve a DESCRIBE type string such as `int`, `decimal(10,1)` or
/// `array<array<string>>`.
///
/// Unknown tokens go to `sink` and resolve to the null type. Nested array
/// text becomes one multi-dimensional [`ArrayType`].
pub fn resolve_column_type(
    type_text: &str,
    column: &str,
    sink: &dyn DiagnosticsSink,
    array_as_tuple: bool,
) -> SqlType {
    let text = type_text.trim();
    let mut inner = text;
    let mut dimensions = 0usize;
    while let Some(item) = ARRAY_OF.captures(inner).and_then(|c| c.get(1)) {
        dimensions += 1;
        inner = item.as_str().trim();
    }

    if dimensions == 0 {
        return match resolve_scalar(text, text, column, sink) {
            SqlType::Array(array) => SqlType::Array(array.with_as_tuple(array_as_tuple)),
            other => other,
        };
    }

    let item_type = match resolve_scalar(inner, text, column, sink) {
        // a bare `array` token inside brackets carries no item type
        SqlType::Array(_) => SqlType::Null,
        other => other,
    };
    let dims = if dimensions > 1 { Some(dimensions) } else { None };
    match ArrayType::new(item_type, dims, false) {
        Ok(array) => SqlType::Array(array.with_as_tuple(array_as_tuple)),
        Err(_) => SqlType::Array(ArrayType::untyped().with_as_tuple(array_as_tuple)),
    }
}

fn resolve_scalar(
    text: &str,
    full_text: &str,
    column: &str,
    sink: &dyn DiagnosticsSink,
) -> SqlType {
    let token = TYPE_TOKEN.find(text).map_or("", |m| m.as_str());
    match registry::resolve(token, full_text, column, sink) {
        SqlType::Decimal { .. } => {
            let (precision, scale) = DECIMAL_ARGS
                .captures(text)
                .map(|c| {
                    (
                        c.get(1).and_then(|m| m.as_str().parse().ok()),
                        c.get(2).and_then(|m| m.as_str().parse().ok()),
                    )
                })
                .unwrap_or((None, None));
            SqlType::Decimal { precision, scale }
        }
        other => other,
    }
}

/// Reflection entry points over a [`Connection`].
pub struct SchemaIntrospector<'a> {
    sink: &'a dyn DiagnosticsSink,
    preparer: &'a IdentifierPreparer,
    array_as_tuple: bool,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(
        sink: &'a dyn DiagnosticsSink,
        preparer: &'a IdentifierPreparer,
        array_as_tuple: bool,
    ) -> Self {
        Self {
            sink,
            preparer,
            array_as_tuple,
        }
    }

    pub fn describe<C: Connection + ?Sized>(
        &self,
        conn: &C,
        table: &TableName,
    ) -> Result<TableDescription> {
        let rows = describe_table(conn, table)?;
        Ok(parse_describe(&rows, self.sink, self.array_as_tuple))
    }

    pub fn has_table<C: Connection + ?Sized>(&self, conn: &C, table: &TableName) -> Result<bool> {
        match describe_table(conn, table) {
            Ok(_) => Ok(true),
            Err(DialectError::NoSuchTable(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn get_columns<C: Connection + ?Sized>(
        &self,
        conn: &C,
        table: &TableName,
    ) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.describe(conn, table)?.columns)
    }

    /// Partition columns, reported as a single non-unique index.
    pub fn get_indexes<C: Connection + ?Sized>(
        &self,
        conn: &C,
        table: &TableName,
    ) -> Result<Vec<IndexInfo>> {
        let partitions = self.describe(conn, table)?.partitions;
        if partitions.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![IndexInfo {
            name: "partition".to_string(),
            column_names: partitions.column_names,
            unique: false,
        }])
    }

    pub fn get_table_names<C: Connection + ?Sized>(
        &self,
        conn: &C,
        schema: Option<&str>,
    ) -> Result<Vec<String>> {
        let mut query = String::from("SHOW TABLES");
        if let Some(schema) = schema {
            query.push_str(" IN ");
            query.push_str(&self.preparer.quote_identifier(schema));
        }
        first_column(conn, &query)
    }

    /// Hive cannot tell views from tables here; this returns every table
    /// so reflection does not fail.
    pub fn get_view_names<C: Connection + ?Sized>(
        &self,
        conn: &C,
        schema: Option<&str>,
    ) -> Result<Vec<String>> {
        self.get_table_names(conn, schema)
    }

    pub fn get_schema_names<C: Connection + ?Sized>(&self, conn: &C) -> Result<Vec<String>> {
        first_column(conn, "SHOW SCHEMAS")
    }

    /// Always empty: Hive keeps no enforced foreign keys.
    pub fn get_foreign_keys<C: Connection + ?Sized>(
        &self,
        _conn: &C,
        _table: &TableName,
    ) -> Result<Vec<ForeignKeyInfo>> {
        Ok(vec![])
    }

    /// Always empty: Hive keeps no enforced primary keys.
    pub fn get_pk_constraint<C: Connection + ?Sized>(
        &self,
        _conn: &C,
        _table: &TableName,
    ) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

fn first_column<C: Connection + ?Sized>(conn: &C, sql: &str) -> Result<Vec<String>> {
    Ok(conn
        .execute(sql)?
        .iter()
        .filter_map(|row| row.text(0).map(str::to_string))
        .collect())
}
