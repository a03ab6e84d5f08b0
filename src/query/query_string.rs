//! Query-String Compiler
//!
//! Compiles an [`Ast`] into the search engine's single-string query
//! syntax, the textual twin of [`to_query_dsl`](crate::query::to_query_dsl).
//!
//! # Examples
//!
//! ```text
//! laptop -is:sold price<=500 color:(red or blue)
//!
//! laptop AND NOT sold:true AND price:<=500 AND color:(red OR blue)
//! ```

use crate::date;
use crate::query::ast::{Ast, Clause, Operator, Value};

/// Characters with a meaning in the query-string syntax
const RESERVED_CHARS: &[char] = &[
    '+', '-', '=', '&', '|', '>', '<', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*',
    '?', ':', '\\', '/',
];

/// Boolean keywords that must not appear bare
const KEYWORDS: [&str; 3] = ["AND", "OR", "NOT"];

/// Compile an AST into a query string; the empty AST matches everything
pub fn to_query_string(ast: &Ast) -> String {
    if ast.is_empty() {
        return "*".to_string();
    }

    let parts: Vec<String> = ast
        .clauses()
        .map(|clause| {
            let body = clause_body(clause);
            if clause.is_must() {
                body
            } else {
                format!("NOT {}", body)
            }
        })
        .collect();

    tracing::debug!(clauses = parts.len(), "Compiled query string");
    parts.join(" AND ")
}

fn clause_body(clause: &Clause) -> String {
    match clause {
        Clause::Term { value, .. } => escape(value),
        Clause::Field {
            field,
            operator,
            value,
            ..
        } => format!("{}:{}", field, comparison(*operator, value)),
        Clause::OrField { field, values, .. } => {
            let values: Vec<String> = values.iter().map(|v| comparison(Operator::Eq, v)).collect();
            format!("{}:({})", field, values.join(" OR "))
        }
        Clause::Is { flag, .. } => format!("{}:true", flag),
    }
}

/// The part after `field:`
fn comparison(operator: Operator, value: &Value) -> String {
    if let Value::Date(d) = value {
        let (start, next) = d.range();
        let start = quote(&date::print_iso8601(start));
        let next = quote(&date::print_iso8601(next));
        return match operator {
            Operator::Eq => format!("[{} TO {}}}", start, next),
            Operator::Gt => format!(">={}", next),
            Operator::Gte => format!(">={}", start),
            Operator::Lt => format!("<{}", start),
            Operator::Lte => format!("<{}", next),
        };
    }

    let value = match value {
        Value::Number(_) => escape_number(&value.to_string()),
        value => escape(&value.to_string()),
    };
    match operator {
        Operator::Eq => value,
        operator => format!("{}{}", operator.sigil(), value),
    }
}

/// Quote text holding whitespace, reserved characters or keywords
fn escape(text: &str) -> String {
    let needs_quotes = text.is_empty()
        || KEYWORDS.contains(&text)
        || text
            .chars()
            .any(|c| c.is_whitespace() || RESERVED_CHARS.contains(&c));

    if needs_quotes {
        quote(text)
    } else {
        text.to_string()
    }
}

/// Numbers stay bare so ranges keep comparing numerically
fn escape_number(text: &str) -> String {
    match text.strip_prefix('-') {
        Some(magnitude) => format!("\\-{}", magnitude),
        None => text.to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
