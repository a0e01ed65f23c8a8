//! Generic statement tree handed to the compilers.
//!
//! This is the shape a query builder produces before any dialect gets
//! involved. The generic compiler renders it as portable SQL; the Hive
//! compiler renders the same tree and then massages the text.
use crate::types::{SqlType, Value};

/// Top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(Box<SelectQuery>),
    Insert(InsertQuery),
    /// Raw SQL passthrough.
    Raw(String),
}

/// A SELECT query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQuery {
    pub distinct: bool,
    pub projections: Vec<SelectItem>,
    pub from: Vec<TableRef>,
    pub joins: Vec<Join>,
    pub filter: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<u64>,
}

/// A single item in the SELECT projection list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    Wildcard,
    /// An expression, optionally aliased: `expr AS alias`.
    Expression {
        expr: Expression,
        alias: Option<String>,
    },
}

/// Possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Unquoted `schema.name` form, as the engine's DESCRIBE expects it.
    pub fn full_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

/// Table reference in FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// `schema.table AS alias`, with optional dialect hint text.
    Table {
        table: TableName,
        alias: Option<String>,
        hint: Option<String>,
    },
    /// `(SELECT ...) AS alias`
    Subquery { query: Box<Query>, alias: String },
}

impl TableRef {
    pub fn table(table: TableName) -> Self {
        TableRef::Table {
            table,
            alias: None,
            hint: None,
        }
    }
}

/// JOIN clause representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// Core expression type.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Column reference, up to `schema.table.column`.
    Column {
        schema: Option<String>,
        table: Option<String>,
        name: String,
    },
    Literal(Literal),
    /// A value rendered inline through its type's literal processor.
    TypedLiteral { value: Value, sql_type: SqlType },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
    Function {
        name: String,
        args: Vec<Expression>,
        distinct: bool,
    },
    /// `char_length(expr)`; dialects may rename it.
    CharLength(Box<Expression>),
    Case {
        operand: Option<Box<Expression>>,
        when_clauses: Vec<(Expression, Expression)>,
        else_clause: Option<Box<Expression>>,
    },
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },
    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },
    Cast {
        expr: Box<Expression>,
        data_type: SqlType,
    },
    /// Wildcard `*` (used in COUNT(*)).
    Wildcard,
    /// Array constructor.
    Array(Vec<Expression>),
    /// `expr[index]`
    Subscript {
        expr: Box<Expression>,
        index: Box<Expression>,
    },
    /// `expr[start:end]`
    Slice {
        expr: Box<Expression>,
        start: Option<Box<Expression>>,
        end: Option<Box<Expression>>,
    },
    Nested(Box<Expression>),
}

impl Expression {
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column {
            schema: None,
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified_column(
        schema: Option<&str>,
        table: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Expression::Column {
            schema: schema.map(str::to_string),
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn integer(value: i64) -> Self {
        Expression::Literal(Literal::Integer(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

/// Literal values in SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    // String
    Like,
    NotLike,
    Concat,
    RegexpMatch,
    NotRegexpMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
}

/// ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expression,
    pub asc: Option<bool>,
}

/// INSERT statement, optionally into a static or dynamic partition.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    pub table: TableName,
    pub partition: Vec<PartitionValue>,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

/// `column = value` inside `PARTITION (...)`; a missing value is a dynamic
/// partition column.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionValue {
    pub column: String,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Vec<Vec<Expression>>),
    Query(Box<Query>),
}
