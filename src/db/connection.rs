use crate::error::Result;
use crate::types::Value;

/// The engine connection, as far as this crate needs one.
///
/// Transport, sessions and authentication live behind this trait. A failed
/// statement should come back as `DialectError::Operational` carrying the
/// engine's error text; the introspector inspects that text to tell a
/// missing table apart from other failures.
pub trait Connection {
    fn execute(&self, sql: &str) -> Result<Vec<Row>>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn execute(&self, sql: &str) -> Result<Vec<Row>> {
        (**self).execute(sql)
    }
}

/// One result row with positional and by-name access.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Row of DESCRIBE output: `col_name`, `data_type`, `comment`.
    pub fn describe(
        col_name: Option<&str>,
        data_type: Option<&str>,
        comment: Option<&str>,
    ) -> Self {
        Self::new(
            vec!["col_name".into(), "data_type".into(), "comment".into()],
            vec![col_name.into(), data_type.into(), comment.into()],
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
    }

    /// Text of cell `index`, `None` for NULL, missing or non-text cells.
    pub fn text(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
