/// Statement tree → SQL text.
///
/// `SqlCompiler` carries a portable rendering in its default methods.
/// Dialects implement the trait and override only the visit hooks whose
/// output their engine rejects; every default method dispatches through
/// `self`, so an override is picked up wherever that node appears.
use super::preparer::IdentifierPreparer;
use super::types::*;
use crate::error::{DialectError, Result};
use crate::types::{SqlType, Value};

/// Renders [`SqlType`]s as DDL / CAST type names.
pub trait TypeCompiler {
    fn type_name(&self, ty: &SqlType) -> Result<String>;
}

/// Portable type names.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericTypeCompiler;

impl TypeCompiler for GenericTypeCompiler {
    fn type_name(&self, ty: &SqlType) -> Result<String> {
        let name = match ty {
            SqlType::Null => {
                return Err(DialectError::UnsupportedOperation(
                    "cannot render a type name for the null type".to_string(),
                ))
            }
            SqlType::Boolean => "BOOLEAN".to_string(),
            SqlType::TinyInteger => "TINYINT".to_string(),
            SqlType::SmallInteger => "SMALLINT".to_string(),
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::BigInteger => "BIGINT".to_string(),
            SqlType::Float => "FLOAT".to_string(),
            SqlType::String => "VARCHAR".to_string(),
            SqlType::Text => "TEXT".to_string(),
            SqlType::Char(len) => with_length("CHAR", *len),
            SqlType::Varchar(len) => with_length("VARCHAR", *len),
            SqlType::Binary => "BLOB".to_string(),
            SqlType::Date => "DATE".to_string(),
            SqlType::Time => "TIME".to_string(),
            SqlType::DateTime => "DATETIME".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::Decimal { precision, scale } => decimal_name(*precision, *scale),
            SqlType::Structured(name) => name.to_uppercase(),
            SqlType::Array(array) => {
                let dims = array.dimensions().unwrap_or(1);
                format!("{}{}", self.type_name(array.item_type())?, "[]".repeat(dims))
            }
        };
        Ok(name)
    }
}

fn with_length(name: &str, length: Option<u32>) -> String {
    match length {
        Some(len) => format!("{}({})", name, len),
        None => name.to_string(),
    }
}

pub(crate) fn decimal_name(precision: Option<u32>, scale: Option<u32>) -> String {
    match (precision, scale) {
        (Some(p), Some(s)) => format!("DECIMAL({}, {})", p, s),
        (Some(p), None) => format!("DECIMAL({})", p),
        _ => "DECIMAL".to_string(),
    }
}

pub trait SqlCompiler {
    fn preparer(&self) -> &IdentifierPreparer;

    fn type_compiler(&self) -> &dyn TypeCompiler;

    fn compile(&self, query: &Query) -> Result<String> {
        match query {
            Query::Select(s) => self.visit_select(s),
            Query::Insert(i) => self.visit_insert(i),
            Query::Raw(sql) => Ok(sql.clone()),
        }
    }

    fn visit_select(&self, select: &SelectQuery) -> Result<String> {
        let mut parts = Vec::new();

        // SELECT [DISTINCT]
        let mut select_clause = String::from("SELECT ");
        if select.distinct {
            select_clause.push_str("DISTINCT ");
        }
        if select.projections.is_empty() {
            select_clause.push('*');
        } else {
            let items = select
                .projections
                .iter()
                .map(|item| self.visit_select_item(item))
                .collect::<Result<Vec<_>>>()?;
            select_clause.push_str(&items.join(", "));
        }
        parts.push(select_clause);

        // FROM
        if !select.from.is_empty() {
            let tables = select
                .from
                .iter()
                .map(|t| self.visit_table_ref(t))
                .collect::<Result<Vec<_>>>()?;
            parts.push(format!("FROM {}", tables.join(", ")));
        }

        // JOINs
        for join in &select.joins {
            parts.push(self.visit_join(join)?);
        }

        // WHERE
        if let Some(ref filter) = select.filter {
            parts.push(format!("WHERE {}", self.visit_expr(filter)?));
        }

        // GROUP BY
        if !select.group_by.is_empty() {
            let groups = self.visit_expr_list(&select.group_by)?;
            parts.push(format!("GROUP BY {}", groups));
        }

        // HAVING
        if let Some(ref having) = select.having {
            parts.push(format!("HAVING {}", self.visit_expr(having)?));
        }

        // ORDER BY
        if !select.order_by.is_empty() {
            let orders = select
                .order_by
                .iter()
                .map(|o| {
                    let expr = self.visit_expr(&o.expr)?;
                    Ok(match o.asc {
                        Some(true) => format!("{} ASC", expr),
                        Some(false) => format!("{} DESC", expr),
                        None => expr,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            parts.push(format!("ORDER BY {}", orders.join(", ")));
        }

        // LIMIT
        if let Some(limit) = select.limit {
            parts.push(format!("LIMIT {}", limit));
        }

        Ok(parts.join(" "))
    }

    fn visit_select_item(&self, item: &SelectItem) -> Result<String> {
        match item {
            SelectItem::Wildcard => Ok("*".to_string()),
            SelectItem::Expression { expr, alias } => {
                let expr_str = self.visit_expr(expr)?;
                Ok(match alias {
                    Some(a) => format!("{} AS {}", expr_str, self.preparer().quote(a)),
                    None => expr_str,
                })
            }
        }
    }

    fn visit_table_ref(&self, table: &TableRef) -> Result<String> {
        match table {
            TableRef::Table { table, alias, hint } => {
                let mut s = self.preparer().format_table(table);
                if let Some(a) = alias {
                    s.push_str(&format!(" AS {}", self.preparer().quote(a)));
                }
                let hint_text = hint
                    .as_deref()
                    .and_then(|h| self.get_from_hint_text(table, h));
                if let Some(hint_text) = hint_text {
                    s.push(' ');
                    s.push_str(&hint_text);
                }
                Ok(s)
            }
            TableRef::Subquery { query, alias } => Ok(format!(
                "({}) AS {}",
                self.compile(query)?,
                self.preparer().quote(alias)
            )),
        }
    }

    fn visit_join(&self, join: &Join) -> Result<String> {
        let type_str = match join.join_type {
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT OUTER JOIN",
            JoinType::Right => "RIGHT OUTER JOIN",
            JoinType::Full => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        };
        let table_str = self.visit_table_ref(&join.table)?;
        match &join.on {
            Some(on) => Ok(format!("{} {} ON {}", type_str, table_str, self.visit_expr(on)?)),
            None => Ok(format!("{} {}", type_str, table_str)),
        }
    }

    /// `INSERT INTO <table> [PARTITION (...)] (<cols>) <source>`
    fn visit_insert(&self, insert: &InsertQuery) -> Result<String> {
        let mut s = format!("INSERT INTO {}", self.preparer().format_table(&insert.table));

        if !insert.partition.is_empty() {
            let specs = insert
                .partition
                .iter()
                .map(|p| {
                    let column = self.preparer().quote(&p.column);
                    Ok(match &p.value {
                        Some(value) => format!("{}={}", column, self.visit_expr(value)?),
                        None => column,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            s.push_str(&format!(" PARTITION ({})", specs.join(", ")));
        }

        let columns: Vec<String> = insert
            .columns
            .iter()
            .map(|c| self.preparer().quote(c))
            .collect();
        s.push_str(&format!(" ({})", columns.join(", ")));

        match &insert.source {
            InsertSource::Values(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| Ok(format!("({})", self.visit_expr_list(row)?)))
                    .collect::<Result<Vec<_>>>()?;
                s.push_str(&format!(" VALUES {}", rows.join(", ")));
            }
            InsertSource::Query(query) => {
                s.push(' ');
                s.push_str(&self.compile(query)?);
            }
        }

        Ok(s)
    }

    fn visit_expr_list(&self, exprs: &[Expression]) -> Result<String> {
        let items = exprs
            .iter()
            .map(|e| self.visit_expr(e))
            .collect::<Result<Vec<_>>>()?;
        Ok(items.join(", "))
    }

    fn visit_column(
        &self,
        schema: Option<&str>,
        table: Option<&str>,
        name: &str,
    ) -> Result<String> {
        let segments: Vec<String> = [schema, table, Some(name)]
            .into_iter()
            .flatten()
            .map(|s| self.preparer().quote(s))
            .collect();
        Ok(segments.join("."))
    }

    fn visit_expr(&self, expr: &Expression) -> Result<String> {
        match expr {
            Expression::Column {
                schema,
                table,
                name,
            } => self.visit_column(schema.as_deref(), table.as_deref(), name),
            Expression::Literal(lit) => Ok(compile_literal(lit)),
            Expression::TypedLiteral { value, sql_type } => {
                self.visit_typed_literal(value, sql_type)
            }
            Expression::BinaryOp { left, op, right } => self.visit_binary(left, *op, right),
            Expression::UnaryOp { op, expr } => {
                let op_str = match op {
                    UnaryOperator::Not => "NOT ",
                    UnaryOperator::Minus => "-",
                };
                Ok(format!("{}{}", op_str, self.visit_expr(expr)?))
            }
            Expression::Function {
                name,
                args,
                distinct,
            } => {
                let distinct_str = if *distinct { "DISTINCT " } else { "" };
                Ok(format!(
                    "{}({}{})",
                    name,
                    distinct_str,
                    self.visit_expr_list(args)?
                ))
            }
            Expression::CharLength(arg) => self.visit_char_length(arg),
            Expression::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let mut s = String::from("CASE");
                if let Some(op) = operand {
                    s.push_str(&format!(" {}", self.visit_expr(op)?));
                }
                for (when, then) in when_clauses {
                    s.push_str(&format!(
                        " WHEN {} THEN {}",
                        self.visit_expr(when)?,
                        self.visit_expr(then)?
                    ));
                }
                if let Some(else_expr) = else_clause {
                    s.push_str(&format!(" ELSE {}", self.visit_expr(else_expr)?));
                }
                s.push_str(" END");
                Ok(s)
            }
            Expression::InList {
                expr,
                list,
                negated,
            } => {
                let not_str = if *negated { "NOT " } else { "" };
                Ok(format!(
                    "{} {}IN ({})",
                    self.visit_expr(expr)?,
                    not_str,
                    self.visit_expr_list(list)?
                ))
            }
            Expression::IsNull { expr, negated } => {
                let suffix = if *negated { "IS NOT NULL" } else { "IS NULL" };
                Ok(format!("{} {}", self.visit_expr(expr)?, suffix))
            }
            Expression::Cast { expr, data_type } => Ok(format!(
                "CAST({} AS {})",
                self.visit_expr(expr)?,
                self.type_compiler().type_name(data_type)?
            )),
            Expression::Wildcard => Ok("*".to_string()),
            Expression::Array(elems) => self.visit_array(elems),
            Expression::Subscript { expr, index } => Ok(format!(
                "{}[{}]",
                self.visit_expr(expr)?,
                self.visit_expr(index)?
            )),
            Expression::Slice { expr, start, end } => {
                let start = match start {
                    Some(s) => self.visit_expr(s)?,
                    None => String::new(),
                };
                let end = match end {
                    Some(e) => self.visit_expr(e)?,
                    None => String::new(),
                };
                Ok(format!("{}[{}:{}]", self.visit_expr(expr)?, start, end))
            }
            Expression::Nested(expr) => Ok(format!("({})", self.visit_expr(expr)?)),
        }
    }

    fn visit_binary(
        &self,
        left: &Expression,
        op: BinaryOperator,
        right: &Expression,
    ) -> Result<String> {
        let op_str = match op {
            BinaryOperator::Concat => return self.visit_concat_op(left, right),
            BinaryOperator::RegexpMatch => return self.visit_regexp_match(left, right, false),
            BinaryOperator::NotRegexpMatch => return self.visit_regexp_match(left, right, true),
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Like => "LIKE",
            BinaryOperator::NotLike => "NOT LIKE",
        };
        Ok(format!(
            "{} {} {}",
            self.visit_expr(left)?,
            op_str,
            self.visit_expr(right)?
        ))
    }

    fn visit_concat_op(&self, left: &Expression, right: &Expression) -> Result<String> {
        Ok(format!("{} || {}", self.visit_expr(left)?, self.visit_expr(right)?))
    }

    fn visit_regexp_match(
        &self,
        _left: &Expression,
        _right: &Expression,
        _negated: bool,
    ) -> Result<String> {
        Err(DialectError::UnsupportedOperation(
            "regular expression match is not supported by this dialect".to_string(),
        ))
    }

    fn visit_char_length(&self, arg: &Expression) -> Result<String> {
        Ok(format!("char_length({})", self.visit_expr(arg)?))
    }

    fn visit_array(&self, elems: &[Expression]) -> Result<String> {
        Ok(format!("ARRAY[{}]", self.visit_expr_list(elems)?))
    }

    fn visit_typed_literal(&self, value: &Value, sql_type: &SqlType) -> Result<String> {
        sql_type.render_literal(value)
    }

    /// Hint text to append after a FROM-clause table; `None` drops the hint.
    fn get_from_hint_text(&self, _table: &TableName, _text: &str) -> Option<String> {
        None
    }
}

fn compile_literal(lit: &Literal) -> String {
    match lit {
        Literal::Null => "NULL".to_string(),
        Literal::Boolean(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        Literal::Integer(i) => i.to_string(),
        Literal::Float(f) => format!("{:?}", f),
        Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

/// The portable compiler, used as a baseline and by tests.
#[derive(Debug, Default, Clone)]
pub struct GenericCompiler {
    preparer: IdentifierPreparer,
}

impl GenericCompiler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SqlCompiler for GenericCompiler {
    fn preparer(&self) -> &IdentifierPreparer {
        &self.preparer
    }

    fn type_compiler(&self) -> &dyn TypeCompiler {
        &GenericTypeCompiler
    }
}

/// Compile with the portable compiler.
pub fn compile(query: &Query) -> Result<String> {
    GenericCompiler::new().compile(query)
}
