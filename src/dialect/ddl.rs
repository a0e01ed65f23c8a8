//! Hive DDL: non-enforced constraints, column comments and the table-level
//! options Hive puts after the column list.
//!
//! Table options come from `TableDef::dialect_options`:
//!
//! | key                     | value                     | emits                    |
//! |-------------------------|---------------------------|--------------------------|
//! | `hive_partitioned_by`   | string                    | `PARTITIONED BY <value>` |
//! | `hive_clustered_by`     | string                    | `CLUSTERED BY <value>`   |
//! | `hive_stored_as`        | string                    | `STORED AS <value>`      |
//! | `hive_table_properties` | object of scalars         | `TBLPROPERTIES (...)`    |
use std::collections::HashMap;

use super::type_compiler::HiveTypeCompiler;
use crate::ast::compiler::TypeCompiler;
use crate::ast::ddl::{
    column_clause, foreign_key_clause, primary_key_clause, ColumnDef, DdlCompiler, TableDef,
};
use crate::ast::preparer::IdentifierPreparer;
use crate::ast::types::TableName;
use crate::error::{DialectError, Result};
use crate::types::quote_string;

pub const PARTITIONED_BY: &str = "hive_partitioned_by";
pub const CLUSTERED_BY: &str = "hive_clustered_by";
pub const STORED_AS: &str = "hive_stored_as";
pub const TABLE_PROPERTIES: &str = "hive_table_properties";

/// Typed view of the `hive_*` entries in a table's dialect options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiveTableOptions {
    pub partitioned_by: Option<String>,
    pub clustered_by: Option<String>,
    pub stored_as: Option<String>,
    pub table_properties: Option<HashMap<String, String>>,
}

impl HiveTableOptions {
    pub fn from_options(options: &HashMap<String, serde_json::Value>) -> Result<Self> {
        let table_properties = match options.get(TABLE_PROPERTIES) {
            None => None,
            Some(serde_json::Value::Object(map)) => Some(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), scalar_text(TABLE_PROPERTIES, v)?)))
                    .collect::<Result<HashMap<_, _>>>()?,
            ),
            Some(other) => {
                return Err(DialectError::Configuration(format!(
                    "{} must be an object, got {}",
                    TABLE_PROPERTIES, other
                )))
            }
        };

        Ok(Self {
            partitioned_by: string_option(options, PARTITIONED_BY)?,
            clustered_by: string_option(options, CLUSTERED_BY)?,
            stored_as: string_option(options, STORED_AS)?,
            table_properties,
        })
    }
}

fn string_option(
    options: &HashMap<String, serde_json::Value>,
    key: &str,
) -> Result<Option<String>> {
    match options.get(key) {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DialectError::Configuration(format!(
            "{} must be a string, got {}",
            key, other
        ))),
    }
}

fn scalar_text(key: &str, value: &serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(DialectError::Configuration(format!(
            "{} values must be scalars, got {}",
            key, other
        ))),
    }
}

/// `TBLPROPERTIES ('a' = '1', 'b' = '2')`, keys sorted.
pub fn table_properties_clause(properties: &HashMap<String, String>) -> String {
    let mut entries: Vec<(&String, &String)> = properties.iter().collect();
    entries.sort();
    let rendered: Vec<String> = entries
        .into_iter()
        .map(|(k, v)| format!("{} = {}", quote_string(k), quote_string(v)))
        .collect();
    format!("TBLPROPERTIES ({})", rendered.join(", "))
}

#[derive(Debug, Clone)]
pub struct HiveDdlCompiler {
    preparer: IdentifierPreparer,
}

impl Default for HiveDdlCompiler {
    fn default() -> Self {
        Self {
            preparer: IdentifierPreparer::always('`'),
        }
    }
}

impl HiveDdlCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Option clauses in emission order; absent options produce nothing.
    pub fn table_options(&self, table: &TableDef) -> Result<Vec<String>> {
        let options = HiveTableOptions::from_options(&table.dialect_options)?;
        let mut clauses = Vec::new();

        if let Some(comment) = table.comment.as_deref().filter(|c| !c.is_empty()) {
            clauses.push(format!("COMMENT {}", quote_string(comment)));
        }
        if let Some(partitioned_by) = options.partitioned_by {
            clauses.push(format!("PARTITIONED BY {}", partitioned_by));
        }
        if let Some(clustered_by) = options.clustered_by {
            clauses.push(format!("CLUSTERED BY {}", clustered_by));
        }
        if let Some(stored_as) = options.stored_as {
            clauses.push(format!("STORED AS {}", stored_as));
        }
        if let Some(properties) = options.table_properties {
            clauses.push(table_properties_clause(&properties));
        }

        Ok(clauses)
    }
}

impl DdlCompiler for HiveDdlCompiler {
    fn preparer(&self) -> &IdentifierPreparer {
        &self.preparer
    }

    fn type_compiler(&self) -> &dyn TypeCompiler {
        &HiveTypeCompiler
    }

    fn visit_create_column(&self, column: &ColumnDef) -> Result<String> {
        let mut text = column_clause(self.preparer(), self.type_compiler(), column)?;
        if let Some(comment) = column.comment.as_deref().filter(|c| !c.is_empty()) {
            text.push_str(&format!(" COMMENT {}", quote_string(comment)));
        }
        Ok(text)
    }

    fn visit_primary_key_constraint(&self, name: Option<&str>, columns: &[String]) -> String {
        format!(
            "{} DISABLE NOVALIDATE RELY",
            primary_key_clause(self.preparer(), name, columns)
        )
    }

    fn visit_foreign_key_constraint(
        &self,
        name: Option<&str>,
        columns: &[String],
        referred_table: &TableName,
        referred_columns: &[String],
    ) -> String {
        format!(
            "{} DISABLE NOVALIDATE",
            foreign_key_clause(
                self.preparer(),
                name,
                columns,
                referred_table,
                referred_columns
            )
        )
    }

    fn post_create_table(&self, table: &TableDef) -> Result<String> {
        let clauses = self.table_options(table)?;
        if clauses.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("\n{}", clauses.join("\n")))
    }
}
