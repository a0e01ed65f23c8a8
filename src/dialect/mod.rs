//! The Hive dialect: statement, type and DDL compilers plus reflection,
//! bundled behind [`HiveDialect`].
pub mod compiler;
pub mod ddl;
pub mod type_compiler;

use std::sync::Arc;

use crate::ast::compiler::{SqlCompiler, TypeCompiler};
use crate::ast::ddl::{DdlCompiler, TableDef};
use crate::ast::preparer::IdentifierPreparer;
use crate::ast::types::{Query, TableName};
use crate::config::DialectConfig;
use crate::db::{
    ColumnDescriptor, Connection, ExecutionContext, ForeignKeyInfo, IndexInfo, SchemaIntrospector,
    TableDescription,
};
use crate::diagnostics::{DiagnosticsSink, TracingSink};
use crate::error::Result;
use crate::types::SqlType;

pub use compiler::{HiveCompiler, RewriteRule};
pub use ddl::{HiveDdlCompiler, HiveTableOptions};
pub use type_compiler::HiveTypeCompiler;

/// What the engine can and cannot do, as far as statement generation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectCapabilities {
    pub supports_transactions: bool,
    pub supports_alter: bool,
    pub supports_views: bool,
    pub supports_pk_autoincrement: bool,
    pub supports_default_values: bool,
    pub supports_empty_insert: bool,
    pub supports_multivalues_insert: bool,
    pub supports_native_decimal: bool,
    pub supports_native_boolean: bool,
    pub supports_sane_rowcount: bool,
    pub supports_sane_multi_rowcount: bool,
    pub supports_statement_cache: bool,
    pub description_encoding: Option<&'static str>,
}

pub const HIVE_CAPABILITIES: DialectCapabilities = DialectCapabilities {
    supports_transactions: false,
    supports_alter: true,
    supports_views: true,
    supports_pk_autoincrement: false,
    supports_default_values: false,
    supports_empty_insert: false,
    supports_multivalues_insert: true,
    supports_native_decimal: true,
    supports_native_boolean: true,
    supports_sane_rowcount: false,
    supports_sane_multi_rowcount: false,
    supports_statement_cache: false,
    description_encoding: None,
};

pub struct HiveDialect {
    config: DialectConfig,
    sink: Arc<dyn DiagnosticsSink>,
    compiler: HiveCompiler,
    ddl_compiler: HiveDdlCompiler,
}

impl Default for HiveDialect {
    fn default() -> Self {
        Self::new(DialectConfig::default())
    }
}

impl HiveDialect {
    pub const NAME: &'static str = "hive";
    pub const DRIVER: &'static str = "thrift";

    pub fn new(config: DialectConfig) -> Self {
        Self {
            config,
            sink: Arc::new(TracingSink),
            compiler: HiveCompiler::new(),
            ddl_compiler: HiveDdlCompiler::new(),
        }
    }

    /// Route unrecognized-type diagnostics somewhere other than `tracing`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn driver(&self) -> &'static str {
        Self::DRIVER
    }

    pub fn capabilities(&self) -> &'static DialectCapabilities {
        &HIVE_CAPABILITIES
    }

    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    pub fn default_schema_name(&self) -> &str {
        &self.config.default_schema
    }

    pub fn preparer(&self) -> &IdentifierPreparer {
        self.compiler.preparer()
    }

    pub fn compile(&self, query: &Query) -> Result<String> {
        self.compiler.compile(query)
    }

    pub fn create_table(&self, table: &TableDef) -> Result<String> {
        self.ddl_compiler.visit_create_table(table)
    }

    pub fn drop_table(&self, table: &TableName) -> String {
        self.ddl_compiler.visit_drop_table(table)
    }

    pub fn type_name(&self, sql_type: &SqlType) -> Result<String> {
        HiveTypeCompiler.type_name(sql_type)
    }

    pub fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::from_config(&self.config)
    }

    /// Hive has no transactions to roll back.
    pub fn do_rollback<C: Connection + ?Sized>(&self, _conn: &C) -> Result<()> {
        Ok(())
    }

    /// `table` qualified with the configured default schema when it names
    /// none. An empty default schema leaves it unqualified.
    pub fn qualify(&self, table: &TableName) -> TableName {
        match (&table.schema, self.default_schema_name()) {
            (None, schema) if !schema.is_empty() => {
                TableName::qualified(schema, table.name.clone())
            }
            _ => table.clone(),
        }
    }

    fn schema_or_default<'s>(&'s self, schema: Option<&'s str>) -> Option<&'s str> {
        schema.or_else(|| Some(self.default_schema_name()).filter(|s| !s.is_empty()))
    }

    fn introspector(&self) -> SchemaIntrospector<'_> {
        SchemaIntrospector::new(
            self.sink.as_ref(),
            self.preparer(),
            self.config.array_as_tuple,
        )
    }

    pub fn describe<C: Connection + ?Sized>(
        &self,
        conn: &C,
        table: &TableName,
    ) -> Result<TableDescription> {
        self.introspector().describe(conn, &self.qualify(table))
    }

    pub fn has_table<C: Connection + ?Sized>(&self, conn: &C, table: &TableName) -> Result<bool> {
        self.introspector().has_table(conn, &self.qualify(table))
    }

    pub fn get_columns<C: Connection + ?Sized>(
        &self,
        conn: &C,
        table: &TableName,
    ) -> Result<Vec<ColumnDescriptor>> {
        self.introspector().get_columns(conn, &self.qualify(table))
    }

    pub fn get_indexes<C: Connection + ?Sized>(
        &self,
        conn: &C,
        table: &TableName,
    ) -> Result<Vec<IndexInfo>> {
        self.introspector().get_indexes(conn, &self.qualify(table))
    }

    pub fn get_table_names<C: Connection + ?Sized>(
        &self,
        conn: &C,
        schema: Option<&str>,
    ) -> Result<Vec<String>> {
        self.introspector().get_table_names(conn, self.schema_or_default(schema))
    }

    pub fn get_view_names<C: Connection + ?Sized>(
        &self,
        conn: &C,
        schema: Option<&str>,
    ) -> Result<Vec<String>> {
        self.introspector().get_view_names(conn, self.schema_or_default(schema))
    }

    pub fn get_schema_names<C: Connection + ?Sized>(&self, conn: &C) -> Result<Vec<String>> {
        self.introspector().get_schema_names(conn)
    }

    pub fn get_foreign_keys<C: Connection + ?Sized>(
        &self,
        conn: &C,
        table: &TableName,
    ) -> Result<Vec<ForeignKeyInfo>> {
        self.introspector().get_foreign_keys(conn, &self.qualify(table))
    }

    pub fn get_pk_constraint<C: Connection + ?Sized>(
        &self,
        conn: &C,
        table: &TableName,
    ) -> Result<Vec<String>> {
        self.introspector().get_pk_constraint(conn, &self.qualify(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ddl::ColumnDef;
    use crate::ast::types::{Expression, InsertQuery, InsertSource};
    use crate::db::Row;
    use crate::diagnostics::MemorySink;
    use crate::error::DialectError;
    use crate::types::ArrayType;
    use std::cell::RefCell;

    struct FixedRows(Vec<Row>);

    impl Connection for FixedRows {
        fn execute(&self, _sql: &str) -> Result<Vec<Row>> {
            Ok(self.0.clone())
        }
    }

    /// Replays the same rows for every statement and records what ran.
    struct Recording {
        rows: Vec<Row>,
        executed: RefCell<Vec<String>>,
    }

    impl Recording {
        fn new(rows: Vec<Row>) -> Self {
            Self {
                rows,
                executed: RefCell::new(vec![]),
            }
        }
    }

    impl Connection for Recording {
        fn execute(&self, sql: &str) -> Result<Vec<Row>> {
            self.executed.borrow_mut().push(sql.to_string());
            Ok(self.rows.clone())
        }
    }

    #[test]
    fn test_default_schema_applied_to_reflection() {
        let conn = Recording::new(vec![Row::describe(Some("a"), Some("int"), None)]);
        let dialect = HiveDialect::new(DialectConfig {
            default_schema: "analytics".into(),
            ..DialectConfig::default()
        });

        dialect.get_columns(&conn, &TableName::new("events")).unwrap();
        dialect
            .has_table(&conn, &TableName::qualified("staging", "events"))
            .unwrap();
        dialect.get_table_names(&conn, None).unwrap();
        dialect.get_view_names(&conn, Some("staging")).unwrap();
        assert_eq!(
            conn.executed.borrow().as_slice(),
            [
                "DESCRIBE analytics.events",
                "DESCRIBE staging.events",
                "SHOW TABLES IN `analytics`",
                "SHOW TABLES IN `staging`",
            ]
        );
    }

    #[test]
    fn test_empty_default_schema_leaves_names_unqualified() {
        let conn = Recording::new(vec![]);
        let dialect = HiveDialect::new(DialectConfig {
            default_schema: String::new(),
            ..DialectConfig::default()
        });
        assert_eq!(dialect.qualify(&TableName::new("t")), TableName::new("t"));
        dialect.get_table_names(&conn, None).unwrap();
        assert_eq!(conn.executed.borrow().as_slice(), ["SHOW TABLES"]);
    }

    #[test]
    fn test_identity_and_capabilities() {
        let dialect = HiveDialect::default();
        assert_eq!(dialect.name(), "hive");
        assert_eq!(dialect.driver(), "thrift");
        assert!(!dialect.capabilities().supports_transactions);
        assert!(dialect.capabilities().supports_multivalues_insert);
        assert!(!dialect.capabilities().supports_sane_rowcount);
        assert_eq!(dialect.default_schema_name(), "default");
        assert!(dialect.do_rollback(&FixedRows(vec![])).is_ok());
    }

    #[test]
    fn test_compile_insert_through_facade() {
        let insert = Query::Insert(InsertQuery {
            table: TableName::qualified("db", "tbl"),
            partition: vec![],
            columns: vec!["a".into()],
            source: InsertSource::Values(vec![vec![Expression::integer(1)]]),
        });
        let sql = HiveDialect::default().compile(&insert).unwrap();
        assert_eq!(sql, "INSERT INTO TABLE `db`.`tbl` VALUES (1)");
    }

    #[test]
    fn test_create_table_and_type_names() {
        let dialect = HiveDialect::default();
        let table = TableDef::new(TableName::new("t")).column(ColumnDef::new(
            "xs",
            SqlType::Array(ArrayType::new(SqlType::Integer, None, false).unwrap()),
        ));
        assert_eq!(
            dialect.create_table(&table).unwrap(),
            "CREATE TABLE `t` (\n\t`xs` ARRAY<INT>\n)"
        );
        assert_eq!(dialect.type_name(&SqlType::Text).unwrap(), "STRING");
        assert_eq!(dialect.drop_table(&TableName::new("t")), "DROP TABLE `t`");
    }

    #[test]
    fn test_reflection_uses_injected_sink() {
        let sink = Arc::new(MemorySink::new());
        let dialect = HiveDialect::default().with_sink(sink.clone());
        let conn = FixedRows(vec![Row::describe(Some("g"), Some("geometry"), None)]);

        let columns = dialect.get_columns(&conn, &TableName::new("t")).unwrap();
        assert_eq!(columns[0].sql_type, SqlType::Null);
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn test_array_as_tuple_from_config() {
        let config = DialectConfig {
            array_as_tuple: true,
            ..DialectConfig::default()
        };
        let dialect = HiveDialect::new(config).with_sink(Arc::new(MemorySink::new()));
        let conn = FixedRows(vec![Row::describe(Some("xs"), Some("array<int>"), None)]);
        let columns = dialect.get_columns(&conn, &TableName::new("t")).unwrap();
        assert!(columns[0].sql_type.as_array().unwrap().as_tuple());
    }

    #[test]
    fn test_has_table_false_for_missing_row() {
        let dialect = HiveDialect::default();
        let conn = FixedRows(vec![Row::describe(
            Some("Table default.gone does not exist"),
            None,
            None,
        )]);
        let table = TableName::qualified("default", "gone");
        assert!(!dialect.has_table(&conn, &table).unwrap());
        assert_eq!(
            dialect.get_indexes(&conn, &table).unwrap_err(),
            DialectError::NoSuchTable("default.gone".into())
        );
    }

    #[test]
    fn test_execution_context_follows_config() {
        let config = DialectConfig::from_toml_str("raw_colnames = true").unwrap();
        assert!(HiveDialect::new(config).execution_context().raw_colnames);
    }
}
