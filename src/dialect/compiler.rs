//! Hive statement compiler.
//!
//! Renders through the generic [`SqlCompiler`] defaults and then rewrites
//! the text where Hive's grammar differs. Text rewrites are expressed as an
//! ordered list of [`RewriteRule`]s; the first rule that matches is applied
//! and a list with no match is an internal consistency failure, because it
//! means the generic renderer produced a shape we did not expect.
use std::sync::LazyLock;

use regex::Regex;

use super::type_compiler::HiveTypeCompiler;
use crate::ast::compiler::{SqlCompiler, TypeCompiler};
use crate::ast::preparer::IdentifierPreparer;
use crate::ast::types::{Expression, InsertQuery, Query, TableName};
use crate::error::{DialectError, Result};

#[derive(Debug)]
pub struct RewriteRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl RewriteRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("rewrite patterns are static and valid"),
            replacement,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Apply the first matching rule in `rules` to `text`.
pub fn apply_rewrites(rules: &[RewriteRule], text: &str, what: &str) -> Result<String> {
    match rules.iter().find(|rule| rule.matches(text)) {
        Some(rule) => {
            tracing::trace!(rule = rule.name, "rewriting {}", what);
            Ok(rule.pattern.replacen(text, 1, rule.replacement).into_owned())
        }
        None => Err(DialectError::InternalConsistency(format!(
            "Unexpected {} result: {}",
            what, text
        ))),
    }
}

// Building blocks for matching rendered text. Quoted identifiers and string
// literals may contain spaces, dots and parentheses.
const QUOTED_IDENT: &str = r#"`(?:[^`]|``)*`|"(?:[^"]|"")*""#;
const STRING_LITERAL: &str = r"'(?:[^'\\]|\\.|'')*'";
const BARE_IDENT: &str = r#"[^\s`"'.()]+"#;
const PLAIN_CHAR: &str = r#"[^()`"']"#;

fn table_pattern() -> String {
    let segment = format!("(?:{}|{})", QUOTED_IDENT, BARE_IDENT);
    format!(r"{seg}(?:\.{seg})*", seg = segment)
}

/// Parenthesized column list: identifiers only.
fn column_list_pattern() -> String {
    format!(r"\((?:{}|{})*\)", QUOTED_IDENT, PLAIN_CHAR)
}

/// Parenthesized partition spec; values may be literals or one level of
/// function call.
fn partition_pattern() -> String {
    let atom = format!("{}|{}|{}", STRING_LITERAL, QUOTED_IDENT, PLAIN_CHAR);
    format!(r"PARTITION \((?:{atom}|\((?:{atom})*\))*\)", atom = atom)
}

/// `INSERT INTO t [PARTITION (..)] (cols) ...` → `INSERT INTO TABLE t [PARTITION (..)] ...`
///
/// Both rules are anchored at the statement head, so text inside VALUES or
/// a SELECT is never rewritten.
pub static INSERT_REWRITES: LazyLock<Vec<RewriteRule>> = LazyLock::new(|| {
    vec![
        RewriteRule::new(
            "insert_partition",
            &format!(
                r"^INSERT INTO (?P<table>{}) (?P<partition>{}) {}",
                table_pattern(),
                partition_pattern(),
                column_list_pattern()
            ),
            "INSERT INTO TABLE ${table} ${partition}",
        ),
        RewriteRule::new(
            "insert",
            &format!(
                r"^INSERT INTO (?P<table>{}) {}",
                table_pattern(),
                column_list_pattern()
            ),
            "INSERT INTO TABLE ${table}",
        ),
    ]
});

/// Rewrite a generically rendered INSERT into Hive's form.
pub fn rewrite_insert(text: &str) -> Result<String> {
    apply_rewrites(&INSERT_REWRITES, text, "visit_insert")
}

/// Byte offsets of the `.` separators outside quoted identifiers.
fn separator_positions(text: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '`' || c == '"' => quote = Some(c),
            None if c == '.' => positions.push(i),
            None => {}
        }
    }
    positions
}

/// Drop the schema from a `schema.table.column` reference; Hive rejects it.
pub fn rewrite_column_reference(text: &str) -> Result<String> {
    let separators = separator_positions(text);
    match separators.as_slice() {
        [] | [_] => Ok(text.to_string()),
        [first, _] => Ok(text[first + 1..].to_string()),
        _ => Err(DialectError::InternalConsistency(format!(
            "Unexpected visit_column result {}",
            text
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct HiveCompiler {
    preparer: IdentifierPreparer,
}

impl Default for HiveCompiler {
    fn default() -> Self {
        Self {
            preparer: IdentifierPreparer::always('`'),
        }
    }
}

impl HiveCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic rendering of `insert`, before Hive's rewrite.
    fn generic_insert(&self, insert: &InsertQuery) -> Result<String> {
        GenericView(self).visit_insert(insert)
    }
}

impl SqlCompiler for HiveCompiler {
    fn preparer(&self) -> &IdentifierPreparer {
        &self.preparer
    }

    fn type_compiler(&self) -> &dyn TypeCompiler {
        &HiveTypeCompiler
    }

    fn visit_insert(&self, insert: &InsertQuery) -> Result<String> {
        let rendered = self.generic_insert(insert)?;
        rewrite_insert(&rendered)
    }

    fn visit_column(
        &self,
        schema: Option<&str>,
        table: Option<&str>,
        name: &str,
    ) -> Result<String> {
        let rendered = GenericView(self).visit_column(schema, table, name)?;
        rewrite_column_reference(&rendered)
    }

    fn visit_concat_op(&self, left: &Expression, right: &Expression) -> Result<String> {
        Ok(format!(
            "concat({}, {})",
            self.visit_expr(left)?,
            self.visit_expr(right)?
        ))
    }

    fn visit_regexp_match(
        &self,
        left: &Expression,
        right: &Expression,
        negated: bool,
    ) -> Result<String> {
        let op = if negated { "NOT REGEXP" } else { "REGEXP" };
        Ok(format!(
            "{} {} {}",
            self.visit_expr(left)?,
            op,
            self.visit_expr(right)?
        ))
    }

    fn visit_char_length(&self, arg: &Expression) -> Result<String> {
        Ok(format!("length({})", self.visit_expr(arg)?))
    }

    fn visit_array(&self, elems: &[Expression]) -> Result<String> {
        Ok(format!("[{}]", self.visit_expr_list(elems)?))
    }

    fn get_from_hint_text(&self, _table: &TableName, text: &str) -> Option<String> {
        Some(text.to_string())
    }
}

/// Runs the trait's default INSERT/column rendering while still routing
/// nested expressions through the Hive overrides.
struct GenericView<'a>(&'a HiveCompiler);

impl SqlCompiler for GenericView<'_> {
    fn preparer(&self) -> &IdentifierPreparer {
        self.0.preparer()
    }

    fn type_compiler(&self) -> &dyn TypeCompiler {
        self.0.type_compiler()
    }

    fn visit_expr(&self, expr: &Expression) -> Result<String> {
        self.0.visit_expr(expr)
    }

    fn compile(&self, query: &Query) -> Result<String> {
        self.0.compile(query)
    }
}
