/// Declarative table definitions and the portable CREATE TABLE renderer.
///
/// Dialect-specific knobs travel in `dialect_options`, a free-form
/// option-name → value map; each dialect's DDL compiler picks out the keys
/// it understands.
use std::collections::HashMap;

use super::compiler::TypeCompiler;
use super::preparer::IdentifierPreparer;
use super::types::TableName;
use crate::error::Result;
use crate::types::SqlType;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub comment: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: true,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        referred_table: TableName,
        referred_columns: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub table: TableName,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<Constraint>,
    pub comment: Option<String>,
    pub dialect_options: HashMap<String, serde_json::Value>,
}

impl TableDef {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            columns: Vec::new(),
            constraints: Vec::new(),
            comment: None,
            dialect_options: HashMap::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.dialect_options.insert(key.into(), value);
        self
    }
}

pub fn column_clause(
    preparer: &IdentifierPreparer,
    types: &dyn TypeCompiler,
    column: &ColumnDef,
) -> Result<String> {
    let mut s = format!(
        "{} {}",
        preparer.quote(&column.name),
        types.type_name(&column.sql_type)?
    );
    if !column.nullable {
        s.push_str(" NOT NULL");
    }
    Ok(s)
}

fn constraint_prefix(preparer: &IdentifierPreparer, name: Option<&str>) -> String {
    match name {
        Some(n) => format!("CONSTRAINT {} ", preparer.quote(n)),
        None => String::new(),
    }
}

fn quoted_list(preparer: &IdentifierPreparer, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| preparer.quote(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn primary_key_clause(
    preparer: &IdentifierPreparer,
    name: Option<&str>,
    columns: &[String],
) -> String {
    format!(
        "{}PRIMARY KEY ({})",
        constraint_prefix(preparer, name),
        quoted_list(preparer, columns)
    )
}

pub fn foreign_key_clause(
    preparer: &IdentifierPreparer,
    name: Option<&str>,
    columns: &[String],
    referred_table: &TableName,
    referred_columns: &[String],
) -> String {
    format!(
        "{}FOREIGN KEY({}) REFERENCES {} ({})",
        constraint_prefix(preparer, name),
        quoted_list(preparer, columns),
        preparer.format_table(referred_table),
        quoted_list(preparer, referred_columns)
    )
}

pub trait DdlCompiler {
    fn preparer(&self) -> &IdentifierPreparer;

    fn type_compiler(&self) -> &dyn TypeCompiler;

    fn visit_create_table(&self, table: &TableDef) -> Result<String> {
        let mut definitions = table
            .columns
            .iter()
            .map(|c| self.visit_create_column(c))
            .collect::<Result<Vec<_>>>()?;
        for constraint in &table.constraints {
            definitions.push(match constraint {
                Constraint::PrimaryKey { name, columns } => {
                    self.visit_primary_key_constraint(name.as_deref(), columns)
                }
                Constraint::ForeignKey {
                    name,
                    columns,
                    referred_table,
                    referred_columns,
                } => self.visit_foreign_key_constraint(
                    name.as_deref(),
                    columns,
                    referred_table,
                    referred_columns,
                ),
            });
        }

        Ok(format!(
            "CREATE TABLE {} (\n\t{}\n){}",
            self.preparer().format_table(&table.table),
            definitions.join(",\n\t"),
            self.post_create_table(table)?
        ))
    }

    fn visit_create_column(&self, column: &ColumnDef) -> Result<String> {
        column_clause(self.preparer(), self.type_compiler(), column)
    }

    fn visit_primary_key_constraint(&self, name: Option<&str>, columns: &[String]) -> String {
        primary_key_clause(self.preparer(), name, columns)
    }

    fn visit_foreign_key_constraint(
        &self,
        name: Option<&str>,
        columns: &[String],
        referred_table: &TableName,
        referred_columns: &[String],
    ) -> String {
        foreign_key_clause(
            self.preparer(),
            name,
            columns,
            referred_table,
            referred_columns,
        )
    }

    /// Table-level options appended after the closing parenthesis.
    fn post_create_table(&self, _table: &TableDef) -> Result<String> {
        Ok(String::new())
    }

    fn visit_drop_table(&self, table: &TableName) -> String {
        format!("DROP TABLE {}", self.preparer().format_table(table))
    }
}

#[derive(Debug, Default, Clone)]
pub struct GenericDdlCompiler {
    preparer: IdentifierPreparer,
}

impl DdlCompiler for GenericDdlCompiler {
    fn preparer(&self) -> &IdentifierPreparer {
        &self.preparer
    }

    fn type_compiler(&self) -> &dyn TypeCompiler {
        &super::compiler::GenericTypeCompiler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_create_table() {
        let table = TableDef::new(TableName::new("users"))
            .column(ColumnDef::new("id", SqlType::Integer).not_null())
            .column(ColumnDef::new("name", SqlType::Varchar(Some(50))))
            .constraint(Constraint::PrimaryKey {
                name: None,
                columns: vec!["id".into()],
            });
        assert_eq!(
            GenericDdlCompiler::default().visit_create_table(&table).unwrap(),
            "CREATE TABLE users (\n\tid INTEGER NOT NULL,\n\tname VARCHAR(50),\n\tPRIMARY KEY (id)\n)"
        );
    }

    #[test]
    fn test_foreign_key_clause() {
        let preparer = IdentifierPreparer::ansi();
        assert_eq!(
            foreign_key_clause(
                &preparer,
                Some("fk_user"),
                &["user_id".to_string()],
                &TableName::qualified("app", "users"),
                &["id".to_string()],
            ),
            "CONSTRAINT fk_user FOREIGN KEY(user_id) REFERENCES app.users (id)"
        );
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(
            GenericDdlCompiler::default().visit_drop_table(&TableName::new("t")),
            "DROP TABLE t"
        );
    }

    #[test]
    fn test_null_type_column_is_error() {
        let table = TableDef::new(TableName::new("t")).column(ColumnDef::new("x", SqlType::Null));
        assert!(GenericDdlCompiler::default()
            .visit_create_table(&table)
            .is_err());
    }
}
