//! Hive SQL dialect adapter.
//!
//! Adapts a generic statement tree and type system to Apache Hive: Hive type
//! names and value coercion, structural rewrites of rendered SQL, Hive table
//! options in DDL, and schema reflection over free-text `DESCRIBE` output.
pub mod ast;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod types;

pub use config::DialectConfig;
pub use dialect::HiveDialect;
pub use error::{DialectError, Result};
