//! Semantic column types understood by the dialect.
//!
//! The set is closed: every conversion (result, bind, literal, DDL name)
//! is a `match` over these variants rather than an open trait hierarchy.
use super::array::ArrayType;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlType {
    /// Unknown or unrecognized type. Values pass through untouched.
    Null,
    Boolean,
    TinyInteger,
    SmallInteger,
    Integer,
    BigInteger,
    /// Hive `float` and `double`.
    Float,
    String,
    Text,
    Char(Option<u32>),
    Varchar(Option<u32>),
    Binary,
    /// Date delivered as text, coerced on read.
    Date,
    Time,
    DateTime,
    /// Timestamp delivered as text, coerced on read.
    Timestamp,
    /// Decimal delivered as text, coerced on read.
    Decimal {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    /// `map<..>`, `struct<..>` and `uniontype<..>`; carried as opaque text.
    Structured(String),
    Array(ArrayType),
}

impl SqlType {
    pub fn name(&self) -> &'static str {
        match self {
            SqlType::Null => "null",
            SqlType::Boolean => "boolean",
            SqlType::TinyInteger => "tinyint",
            SqlType::SmallInteger => "smallint",
            SqlType::Integer => "integer",
            SqlType::BigInteger => "bigint",
            SqlType::Float => "float",
            SqlType::String => "string",
            SqlType::Text => "text",
            SqlType::Char(_) => "char",
            SqlType::Varchar(_) => "varchar",
            SqlType::Binary => "binary",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::DateTime => "datetime",
            SqlType::Timestamp => "timestamp",
            SqlType::Decimal { .. } => "decimal",
            SqlType::Structured(_) => "structured",
            SqlType::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlType::Null)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            SqlType::TinyInteger | SqlType::SmallInteger | SqlType::Integer | SqlType::BigInteger
        )
    }

    /// Types whose engine value is a plain string.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            SqlType::String
                | SqlType::Text
                | SqlType::Char(_)
                | SqlType::Varchar(_)
                | SqlType::Binary
                | SqlType::Structured(_)
        )
    }

    /// Types that are parsed from text on read and refuse writes.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            SqlType::Date | SqlType::Timestamp | SqlType::Decimal { .. }
        )
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            SqlType::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<ArrayType> for SqlType {
    fn from(array: ArrayType) -> Self {
        SqlType::Array(array)
    }
}
