//! Query Printer
//!
//! Prints an [`Ast`] back to query text. Printing then parsing yields an
//! equal AST: values are quoted whenever their bare form would parse as
//! something else.

use crate::date;
use crate::query::ast::{Ast, Clause, Value};
use crate::query::parser::infer_value;

/// Characters that end or alter a bare word
const SPECIAL_CHARS: [char; 7] = ['(', ')', '"', '\\', ':', '<', '>'];

/// Print an AST as query text
pub fn print_query(ast: &Ast) -> String {
    ast.clauses()
        .map(print_clause)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print a single clause
pub fn print_clause(clause: &Clause) -> String {
    let sign = if clause.is_must() { "" } else { "-" };
    match clause {
        Clause::Term { value, .. } => format!("{}{}", sign, quote(value)),
        Clause::Field {
            field,
            operator,
            value,
            ..
        } => format!("{}{}{}{}", sign, field, operator, print_value(value)),
        Clause::OrField { field, values, .. } => {
            let values: Vec<String> = values.iter().map(print_value).collect();
            format!("{}{}:({})", sign, field, values.join(" or "))
        }
        Clause::Is { flag, .. } => format!("{}is:{}", sign, flag),
    }
}

fn print_value(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Date(d) => quote(&date::print(d, None)),
    }
}

/// Quote `text` if it would not survive as a bare word
fn quote(text: &str) -> String {
    if !needs_quotes(text) {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.starts_with('-')
        || text.eq_ignore_ascii_case("or")
        || text
            .chars()
            .any(|c| c.is_whitespace() || SPECIAL_CHARS.contains(&c))
        || !matches!(infer_value(text), Value::String(_))
}
