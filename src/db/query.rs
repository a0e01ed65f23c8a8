use super::connection::{Connection, Row};
use crate::config::DialectConfig;
use crate::error::{DialectError, Result};
use crate::types::{SqlType, Value};

/// Per-execution options that affect how results are read back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Keep dotted column names verbatim.
    pub raw_colnames: bool,
}

impl ExecutionContext {
    pub fn from_config(config: &DialectConfig) -> Self {
        Self {
            raw_colnames: config.raw_colnames,
        }
    }

    /// Hive reports result columns as `table.column` by default. Unless raw
    /// names are requested, the lookup key is the rightmost segment and the
    /// original name is returned alongside it.
    pub fn translate_colname(&self, colname: &str) -> (String, Option<String>) {
        if !self.raw_colnames && colname.contains('.') {
            let short = colname.rsplit('.').next().unwrap_or(colname);
            (short.to_string(), Some(colname.to_string()))
        } else {
            (colname.to_string(), None)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Name used for lookups.
    pub name: String,
    /// The engine's name when it differs from `name`.
    pub original_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self {
            columns: vec![],
            rows: vec![],
        }
    }

    pub fn from_rows(rows: Vec<Row>, context: &ExecutionContext) -> Self {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| {
                        let (name, original_name) = context.translate_colname(c);
                        ColumnInfo {
                            name,
                            original_name,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        let rows = rows.into_iter().map(Row::into_values).collect();
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.original_name.as_deref() == Some(name))
            })
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Run every cell through its column type's result processor.
    pub fn coerce(self, types: &[SqlType]) -> Result<Self> {
        if types.len() != self.columns.len() {
            return Err(DialectError::Configuration(format!(
                "{} result types given for {} columns",
                types.len(),
                self.columns.len()
            )));
        }
        let processors: Vec<_> = types.iter().map(SqlType::result_processor).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&processors)
                    .map(|(value, processor)| match processor {
                        Some(process) => process(value),
                        None => Ok(value),
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns: self.columns,
            rows,
        })
    }
}

/// Execute `sql` and collect the rows with column names translated.
pub fn execute_query<C: Connection + ?Sized>(
    conn: &C,
    sql: &str,
    context: &ExecutionContext,
) -> Result<QueryResult> {
    tracing::debug!(sql, "executing");
    let rows = conn.execute(sql)?;
    Ok(QueryResult::from_rows(rows, context))
}
