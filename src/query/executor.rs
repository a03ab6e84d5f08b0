//! Query Executor
//!
//! Filters an in-memory collection of JSON records with an [`Ast`].
//!
//! # Execution Model
//!
//! ```text
//! for each record:
//!     every clause must hit (AND), stopping at the first miss
//!     a must-not clause hits when its condition does not hold
//! ```
//!
//! Execution never fails: absent fields, type mismatches and unknown flags
//! all evaluate to "condition does not hold".

use crate::query::ast::{Ast, Clause, Operator, Value};
use crate::query::printer::print_clause;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value as Json};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Key under which `explain` stores the per-clause trail
pub const EXPLAIN_KEY: &str = "__explain";

/// Custom `is:` matcher: `(record, flag, must) -> hit`
pub type IsClauseMatcher = Arc<dyn Fn(&Json, &str, bool) -> bool + Send + Sync>;

/// Execution options
#[derive(Clone, Default)]
pub struct ExecuteOptions {
    /// Fields scanned by term clauses; empty scans every string field
    pub default_fields: Vec<String>,
    /// Replaces the default `is:` matcher when set
    pub is_clause_matcher: Option<IsClauseMatcher>,
    /// Attach a per-clause trail to each matching record
    pub explain: bool,
}

impl std::fmt::Debug for ExecuteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("default_fields", &self.default_fields)
            .field("is_clause_matcher", &self.is_clause_matcher.is_some())
            .field("explain", &self.explain)
            .finish()
    }
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the fields scanned by term clauses
    pub fn default_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: override how `is:` clauses match
    pub fn is_clause_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&Json, &str, bool) -> bool + Send + Sync + 'static,
    {
        self.is_clause_matcher = Some(Arc::new(matcher));
        self
    }

    /// Builder method: enable the explain trail
    pub fn explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }
}

/// Return the records that satisfy every clause of `ast`, in input order
pub fn execute(ast: &Ast, items: &[Json], options: &ExecuteOptions) -> Vec<Json> {
    let start = Instant::now();

    let matched: Vec<Json> = items
        .iter()
        .filter_map(|item| {
            if options.explain {
                explain(ast, item, options)
            } else {
                ast.clauses()
                    .all(|clause| matches_clause(clause, item, options))
                    .then(|| item.clone())
            }
        })
        .collect();

    tracing::debug!(
        clauses = ast.len(),
        items = items.len(),
        matched = matched.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Executed query"
    );
    matched
}

/// Evaluate a single clause against a record
pub fn matches_clause(clause: &Clause, record: &Json, options: &ExecuteOptions) -> bool {
    match clause {
        Clause::Term { value, must } => matches_term(record, value, options) == *must,
        Clause::Field {
            field,
            operator,
            value,
            must,
        } => lookup(record, field)
            .map(|actual| matches_field(actual, *operator, value))
            .unwrap_or(false)
            == *must,
        Clause::OrField {
            field,
            values,
            must,
        } => lookup(record, field)
            .map(|actual| values.iter().any(|v| matches_field(actual, Operator::Eq, v)))
            .unwrap_or(false)
            == *must,
        Clause::Is { flag, must } => match &options.is_clause_matcher {
            Some(matcher) => matcher(record, flag, *must),
            None => lookup(record, flag).map(truthy).unwrap_or(false) == *must,
        },
    }
}

/// Evaluate every clause, keeping the trail on matching records
fn explain(ast: &Ast, item: &Json, options: &ExecuteOptions) -> Option<Json> {
    let mut all_hit = true;
    let trail: Vec<Json> = ast
        .clauses()
        .map(|clause| {
            let hit = matches_clause(clause, item, options);
            all_hit &= hit;
            json!({
                "clause": print_clause(clause),
                "type": clause.kind(),
                "hit": hit,
            })
        })
        .collect();

    if !all_hit {
        return None;
    }
    let mut item = item.clone();
    if let Json::Object(map) = &mut item {
        map.insert(EXPLAIN_KEY.to_string(), Json::Array(trail));
    }
    Some(item)
}

/// Resolve a field, trying the literal key before a dotted path
fn lookup<'a>(record: &'a Json, path: &str) -> Option<&'a Json> {
    let found = match record.get(path) {
        Some(value) => Some(value),
        None => path
            .split('.')
            .try_fold(record, |current, segment| current.get(segment)),
    };
    found.filter(|value| !value.is_null())
}

fn matches_term(record: &Json, needle: &str, options: &ExecuteOptions) -> bool {
    let needle = needle.to_lowercase();

    if options.default_fields.is_empty() {
        let Json::Object(map) = record else {
            return false;
        };
        return map.values().any(|value| contains_text(value, &needle, false));
    }

    options
        .default_fields
        .iter()
        .filter_map(|field| lookup(record, field))
        .any(|value| contains_text(value, &needle, true))
}

/// Case-insensitive substring search; scalars are stringified only when asked
fn contains_text(value: &Json, needle: &str, stringify: bool) -> bool {
    match value {
        Json::String(s) => s.to_lowercase().contains(needle),
        Json::Number(n) if stringify => n.to_string().contains(needle),
        Json::Bool(b) if stringify => b.to_string().contains(needle),
        Json::Array(items) => items.iter().any(|v| contains_text(v, needle, stringify)),
        _ => false,
    }
}

/// Compare a record value with a clause value; collections match on any member
fn matches_field(actual: &Json, operator: Operator, expected: &Value) -> bool {
    if let Json::Array(items) = actual {
        return items.iter().any(|item| matches_field(item, operator, expected));
    }

    match expected {
        Value::Date(date) => {
            let Some(instant) = record_instant(actual) else {
                return false;
            };
            let (start, next) = date.range();
            match operator {
                Operator::Eq => instant >= start && instant < next,
                Operator::Gt => instant >= next,
                Operator::Gte => instant >= start,
                Operator::Lt => instant < start,
                Operator::Lte => instant < next,
            }
        }
        Value::Number(expected) => record_number(actual)
            .and_then(|n| n.partial_cmp(expected))
            .map(|ordering| satisfies(ordering, operator))
            .unwrap_or(false),
        Value::Bool(expected) => {
            operator == Operator::Eq && record_bool(actual) == Some(*expected)
        }
        Value::String(expected) => {
            let expected = expected.to_lowercase();
            match (operator, actual) {
                (Operator::Eq, Json::String(s)) => s.to_lowercase() == expected,
                (Operator::Eq, Json::Number(n)) => n.to_string() == expected,
                (Operator::Eq, Json::Bool(b)) => b.to_string() == expected,
                (_, Json::String(s)) => satisfies(s.to_lowercase().cmp(&expected), operator),
                _ => false,
            }
        }
    }
}

fn satisfies(ordering: Ordering, operator: Operator) -> bool {
    match operator {
        Operator::Eq => ordering == Ordering::Equal,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Gte => ordering != Ordering::Less,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Lte => ordering != Ordering::Greater,
    }
}

/// Numbers, and strings holding numbers (as CSV input does)
fn record_number(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn record_bool(value: &Json) -> Option<bool> {
    match value {
        Json::Bool(b) => Some(*b),
        Json::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Json::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// RFC 3339 or `YYYY-MM-DD` strings, or epoch milliseconds
fn record_instant(value: &Json) -> Option<DateTime<Utc>> {
    match value {
        Json::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|d| d.and_utc())
            }),
        Json::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Same reading as `field:true`
fn truthy(value: &Json) -> bool {
    record_bool(value).unwrap_or(false)
}
