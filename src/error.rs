use thiserror::Error;

/// Errors raised by the Hive dialect layer.
///
/// `NoSuchTable` is the only variant callers are expected to branch on;
/// everything else is surfaced unchanged and no retries happen here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialectError {
    /// The described table does not exist.
    #[error("no such table: {0}")]
    NoSuchTable(String),

    /// A result value could not be parsed into its declared type.
    #[error("could not parse {value:?} as {target}")]
    Format { target: &'static str, value: String },

    /// Writing or binding a value of a read-only coerced type.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Invalid type construction or malformed dialect options.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A rewrite pattern did not match the generically rendered SQL.
    #[error("internal consistency failure: {0}")]
    InternalConsistency(String),

    /// Failure reported by the engine connection, with the engine's text.
    #[error("operational error: {0}")]
    Operational(String),
}

impl DialectError {
    pub fn format(target: &'static str, value: impl Into<String>) -> Self {
        DialectError::Format {
            target,
            value: value.into(),
        }
    }

    pub fn is_no_such_table(&self) -> bool {
        matches!(self, DialectError::NoSuchTable(_))
    }
}

pub type Result<T> = std::result::Result<T, DialectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_message() {
        let err = DialectError::format("date", "not-a-date");
        assert_eq!(err.to_string(), "could not parse \"not-a-date\" as date");
    }

    #[test]
    fn test_no_such_table_predicate() {
        assert!(DialectError::NoSuchTable("t".into()).is_no_such_table());
        assert!(!DialectError::Operational("boom".into()).is_no_such_table());
    }
}
