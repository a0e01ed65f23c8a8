/// Hive type system: token registry, semantic types and value coercion.
///
/// ```text
/// DESCRIBE text ("decimal(10,1)", "array<int>")
///       ↓
/// Type Registry        (registry.rs)
///       ↓
/// SqlType / ArrayType  (sql_type.rs, array.rs)
///       ↓
/// Processors           (coercion.rs)  result / bind / literal
/// ```
pub mod array;
pub mod coercion;
pub mod registry;
pub mod sql_type;
pub mod value;

pub use array::ArrayType;
pub use coercion::{quote_string, BindProcessor, LiteralProcessor, ResultProcessor};
pub use sql_type::SqlType;
pub use value::Value;
