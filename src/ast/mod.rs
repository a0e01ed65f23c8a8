/// Generic statement tree and its portable SQL renderer.
///
/// ```text
/// Query builder
///       ↓
/// Statement tree          (types.rs)
///       ↓
/// SqlCompiler             (compiler.rs, preparer.rs)
/// DdlCompiler             (ddl.rs)
///       ↓
/// Dialect overrides       (crate::dialect)
/// ```
pub mod compiler;
pub mod ddl;
pub mod preparer;
pub mod types;

pub use compiler::{compile, GenericCompiler, GenericTypeCompiler, SqlCompiler, TypeCompiler};
pub use ddl::{ColumnDef, Constraint, DdlCompiler, GenericDdlCompiler, TableDef};
pub use preparer::IdentifierPreparer;
pub use types::*;
