//! Engine type-name tokens → [`SqlType`].
use super::array::ArrayType;
use super::sql_type::SqlType;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};

/// Look up a type token such as `int` or `decimal`. Case-insensitive.
pub fn lookup(token: &str) -> Option<SqlType> {
    let ty = match token.to_ascii_lowercase().as_str() {
        "boolean" => SqlType::Boolean,
        "tinyint" => SqlType::TinyInteger,
        "smallint" => SqlType::SmallInteger,
        "int" | "integer" => SqlType::Integer,
        "bigint" => SqlType::BigInteger,
        "float" | "double" => SqlType::Float,
        "string" | "varchar" | "char" | "binary" => SqlType::String,
        "date" => SqlType::Date,
        "timestamp" => SqlType::Timestamp,
        "decimal" => SqlType::Decimal {
            precision: None,
            scale: None,
        },
        "array" => SqlType::Array(ArrayType::untyped()),
        "map" => SqlType::Structured("map".to_string()),
        "struct" => SqlType::Structured("struct".to_string()),
        "uniontype" => SqlType::Structured("uniontype".to_string()),
        _ => return None,
    };
    Some(ty)
}

/// Total version of [`lookup`]: unknown tokens are reported to `sink` and
/// resolve to [`SqlType::Null`].
pub fn resolve(
    token: &str,
    type_text: &str,
    column: &str,
    sink: &dyn DiagnosticsSink,
) -> SqlType {
    match lookup(token) {
        Some(ty) => ty,
        None => {
            sink.emit(Diagnostic::UnrecognizedType {
                type_text: type_text.to_string(),
                column: column.to_string(),
            });
            SqlType::Null
        }
    }
}
