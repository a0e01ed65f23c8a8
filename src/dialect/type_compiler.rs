use crate::ast::compiler::{decimal_name, GenericTypeCompiler, TypeCompiler};
use crate::error::Result;
use crate::types::SqlType;

/// Hive column type names.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiveTypeCompiler;

impl TypeCompiler for HiveTypeCompiler {
    fn type_name(&self, ty: &SqlType) -> Result<String> {
        let name = match ty {
            SqlType::Integer => "INT".to_string(),
            SqlType::String | SqlType::Text | SqlType::Char(_) | SqlType::Varchar(_) => {
                "STRING".to_string()
            }
            SqlType::Binary => "BINARY".to_string(),
            SqlType::Time | SqlType::DateTime | SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::Decimal { precision, scale } => decimal_name(*precision, *scale),
            SqlType::Array(array) => {
                let mut name = self.type_name(array.item_type())?;
                for _ in 0..array.dimensions().unwrap_or(1) {
                    name = format!("ARRAY<{}>", name);
                }
                name
            }
            other => GenericTypeCompiler.type_name(other)?,
        };
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArrayType;

    #[test]
    fn test_hive_type_names() {
        let t = HiveTypeCompiler;
        assert_eq!(t.type_name(&SqlType::Integer).unwrap(), "INT");
        assert_eq!(t.type_name(&SqlType::Varchar(Some(10))).unwrap(), "STRING");
        assert_eq!(t.type_name(&SqlType::Text).unwrap(), "STRING");
        assert_eq!(t.type_name(&SqlType::Binary).unwrap(), "BINARY");
        assert_eq!(t.type_name(&SqlType::DateTime).unwrap(), "TIMESTAMP");
        assert_eq!(t.type_name(&SqlType::Time).unwrap(), "TIMESTAMP");
        assert_eq!(t.type_name(&SqlType::Date).unwrap(), "DATE");
        assert_eq!(t.type_name(&SqlType::BigInteger).unwrap(), "BIGINT");
        assert_eq!(
            t.type_name(&SqlType::Decimal {
                precision: None,
                scale: None
            })
            .unwrap(),
            "DECIMAL"
        );
    }

    #[test]
    fn test_hive_array_type_names() {
        let t = HiveTypeCompiler;
        let one = ArrayType::new(SqlType::Integer, None, false).unwrap();
        assert_eq!(t.type_name(&SqlType::Array(one)).unwrap(), "ARRAY<INT>");
        let two = ArrayType::new(SqlType::String, Some(2), false).unwrap();
        assert_eq!(
            t.type_name(&SqlType::Array(two)).unwrap(),
            "ARRAY<ARRAY<STRING>>"
        );
    }
}
