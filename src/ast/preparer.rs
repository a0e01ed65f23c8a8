/// Identifier quoting.
///
/// The ANSI preparer quotes only identifiers that need it. Dialects that
/// prefer to quote unconditionally set `quote_all`, which sidesteps any
/// reserved-word bookkeeping.
use super::types::TableName;

const ANSI_RESERVED: &[&str] = &[
    "all", "and", "as", "by", "case", "create", "from", "group", "in", "insert", "into", "is",
    "join", "not", "null", "on", "or", "order", "select", "table", "to", "union", "where",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierPreparer {
    initial_quote: char,
    final_quote: char,
    quote_all: bool,
}

impl Default for IdentifierPreparer {
    fn default() -> Self {
        Self::ansi()
    }
}

impl IdentifierPreparer {
    pub fn ansi() -> Self {
        Self {
            initial_quote: '"',
            final_quote: '"',
            quote_all: false,
        }
    }

    /// Quote every identifier with `quote`.
    pub fn always(quote: char) -> Self {
        Self {
            initial_quote: quote,
            final_quote: quote,
            quote_all: true,
        }
    }

    pub fn requires_quotes(&self, ident: &str) -> bool {
        if self.quote_all {
            return true;
        }
        let mut chars = ident.chars();
        let starts_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
        let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        !(starts_ok && rest_ok) || ANSI_RESERVED.contains(&ident)
    }

    /// Quote `ident` unconditionally, doubling any embedded closing quote.
    pub fn quote_identifier(&self, ident: &str) -> String {
        let doubled: String = [self.final_quote, self.final_quote].iter().collect();
        format!(
            "{}{}{}",
            self.initial_quote,
            ident.replace(self.final_quote, &doubled),
            self.final_quote
        )
    }

    pub fn quote(&self, ident: &str) -> String {
        if self.requires_quotes(ident) {
            self.quote_identifier(ident)
        } else {
            ident.to_string()
        }
    }

    pub fn format_table(&self, table: &TableName) -> String {
        match &table.schema {
            Some(schema) => format!("{}.{}", self.quote(schema), self.quote(&table.name)),
            None => self.quote(&table.name),
        }
    }
}
