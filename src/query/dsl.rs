//! DSL Compiler
//!
//! Compiles an [`Ast`] into a boolean compound query object for a remote
//! search engine.
//!
//! # Output Shape
//!
//! ```text
//! laptop -is:sold price<=500
//!
//! {"bool": {
//!     "must":     [{"simple_query_string": {"query": "laptop", ...}},
//!                  {"range": {"price": {"lte": 500.0}}}],
//!     "must_not": [{"term": {"sold": true}}]
//! }}
//! ```
//!
//! Every clause-to-query translation can be replaced through
//! [`DslOptions`]; a supplied hook is always preferred over the built-in
//! translation and its errors are returned untouched.

use crate::date;
use crate::query::ast::{Ast, Clause, Operator, Value};
use crate::query::error::{HookError, QueryError, QueryResult};
use serde_json::{json, Map, Value as Json};
use std::sync::Arc;

/// `(flag, value) -> query`
pub type IsToQuery = Arc<dyn Fn(&str, bool) -> Result<Json, HookError> + Send + Sync>;

/// `(terms, default_fields) -> query`
pub type TermValuesToQuery =
    Arc<dyn Fn(&[String], &[String]) -> Result<Json, HookError> + Send + Sync>;

/// `(field, operations) -> query` where every operation must hold
pub type FieldValuesToAndQuery =
    Arc<dyn Fn(&str, &[FieldOperation]) -> Result<Json, HookError> + Send + Sync>;

/// `(field, values) -> query` where any value may match
pub type FieldValuesToOrQuery =
    Arc<dyn Fn(&str, &[Value]) -> Result<Json, HookError> + Send + Sync>;

/// One comparison against a field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOperation {
    pub operator: Operator,
    pub value: Value,
}

/// Compiler options
#[derive(Clone, Default)]
pub struct DslOptions {
    /// Fields searched by free-text terms; empty searches all fields
    pub default_fields: Vec<String>,
    pub is_to_query: Option<IsToQuery>,
    pub term_values_to_query: Option<TermValuesToQuery>,
    pub field_values_to_and_query: Option<FieldValuesToAndQuery>,
    pub field_values_to_or_query: Option<FieldValuesToOrQuery>,
}

impl std::fmt::Debug for DslOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DslOptions")
            .field("default_fields", &self.default_fields)
            .field("is_to_query", &self.is_to_query.is_some())
            .field("term_values_to_query", &self.term_values_to_query.is_some())
            .field(
                "field_values_to_and_query",
                &self.field_values_to_and_query.is_some(),
            )
            .field(
                "field_values_to_or_query",
                &self.field_values_to_or_query.is_some(),
            )
            .finish()
    }
}

impl DslOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the fields searched by free-text terms
    pub fn default_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: override the `is:` translation
    pub fn is_to_query<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, bool) -> Result<Json, HookError> + Send + Sync + 'static,
    {
        self.is_to_query = Some(Arc::new(hook));
        self
    }

    /// Builder method: override the free-text translation
    pub fn term_values_to_query<F>(mut self, hook: F) -> Self
    where
        F: Fn(&[String], &[String]) -> Result<Json, HookError> + Send + Sync + 'static,
    {
        self.term_values_to_query = Some(Arc::new(hook));
        self
    }

    /// Builder method: override the field translation
    pub fn field_values_to_and_query<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &[FieldOperation]) -> Result<Json, HookError> + Send + Sync + 'static,
    {
        self.field_values_to_and_query = Some(Arc::new(hook));
        self
    }

    /// Builder method: override the or-field translation
    pub fn field_values_to_or_query<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Result<Json, HookError> + Send + Sync + 'static,
    {
        self.field_values_to_or_query = Some(Arc::new(hook));
        self
    }

    fn is_query(&self, flag: &str) -> QueryResult<Json> {
        match &self.is_to_query {
            Some(hook) => hook(flag, true).map_err(QueryError::Hook),
            None => Ok(is_to_query(flag, true)),
        }
    }

    fn terms_query(&self, terms: &[String]) -> QueryResult<Json> {
        match &self.term_values_to_query {
            Some(hook) => hook(terms, &self.default_fields).map_err(QueryError::Hook),
            None => Ok(term_values_to_query(terms, &self.default_fields)),
        }
    }

    fn and_query(&self, field: &str, operations: &[FieldOperation]) -> QueryResult<Json> {
        match &self.field_values_to_and_query {
            Some(hook) => hook(field, operations).map_err(QueryError::Hook),
            None => Ok(field_values_to_and_query(field, operations)),
        }
    }

    fn or_query(&self, field: &str, values: &[Value]) -> QueryResult<Json> {
        match &self.field_values_to_or_query {
            Some(hook) => hook(field, values).map_err(QueryError::Hook),
            None => Ok(field_values_to_or_query(field, values)),
        }
    }
}

/// Compile an AST into a boolean compound query
pub fn to_query_dsl(ast: &Ast, options: &DslOptions) -> QueryResult<Json> {
    if ast.is_empty() {
        return Ok(json!({ "match_all": {} }));
    }

    let mut must = Vec::new();
    let mut must_not = Vec::new();

    // All must-terms share one query; each must-not term is excluded on its own
    let must_terms: Vec<String> = ast
        .term_clauses()
        .filter_map(|clause| match clause {
            Clause::Term { value, must: true } => Some(value.clone()),
            _ => None,
        })
        .collect();
    if !must_terms.is_empty() {
        must.push(options.terms_query(&must_terms)?);
    }
    for clause in ast.term_clauses() {
        if let Clause::Term { value, must: false } = clause {
            must_not.push(options.terms_query(std::slice::from_ref(value))?);
        }
    }

    let mut groups: Vec<(&str, Vec<FieldOperation>)> = Vec::new();
    for clause in ast.field_clauses(None) {
        let Clause::Field {
            field,
            operator,
            value,
            must: polarity,
        } = clause
        else {
            continue;
        };
        let operation = FieldOperation {
            operator: *operator,
            value: value.clone(),
        };
        if !*polarity {
            must_not.push(options.and_query(field, &[operation])?);
            continue;
        }
        match groups.iter_mut().find(|(name, _)| *name == field.as_str()) {
            Some((_, operations)) => operations.push(operation),
            None => groups.push((field.as_str(), vec![operation])),
        }
    }
    for (field, operations) in &groups {
        must.push(options.and_query(field, operations)?);
    }

    for clause in ast.clauses() {
        match clause {
            Clause::OrField {
                field,
                values,
                must: polarity,
            } => {
                let query = options.or_query(field, values)?;
                if *polarity {
                    must.push(query);
                } else {
                    must_not.push(query);
                }
            }
            Clause::Is {
                flag,
                must: polarity,
            } => {
                let query = options.is_query(flag)?;
                if *polarity {
                    must.push(query);
                } else {
                    must_not.push(query);
                }
            }
            _ => {}
        }
    }

    tracing::debug!(
        clauses = ast.len(),
        must = must.len(),
        must_not = must_not.len(),
        "Compiled query DSL"
    );

    let mut compound = Map::new();
    if !must.is_empty() {
        compound.insert("must".to_string(), Json::Array(must));
    }
    if !must_not.is_empty() {
        compound.insert("must_not".to_string(), Json::Array(must_not));
    }
    Ok(json!({ "bool": compound }))
}

/// Built-in `is:` translation: a term query on the flag field
pub fn is_to_query(flag: &str, value: bool) -> Json {
    json!({ "term": { flag: value } })
}

/// Built-in free-text translation: one `simple_query_string` requiring every term
pub fn term_values_to_query(terms: &[String], default_fields: &[String]) -> Json {
    let query: Vec<String> = terms.iter().map(|term| simple_query_term(term)).collect();

    let mut body = Map::new();
    body.insert("query".to_string(), Json::String(query.join(" ")));
    body.insert("default_operator".to_string(), json!("and"));
    if !default_fields.is_empty() {
        body.insert("fields".to_string(), json!(default_fields));
    }
    json!({ "simple_query_string": body })
}

/// Characters `simple_query_string` reads as operators
const SIMPLE_QUERY_OPERATORS: &[char] = &['+', '-', '|', '*', '(', ')', '~', '"', '\\'];

/// A term as a literal: anything with whitespace or operators becomes a phrase
fn simple_query_term(term: &str) -> String {
    let literal = !term.is_empty()
        && !term
            .chars()
            .any(|c| c.is_whitespace() || SIMPLE_QUERY_OPERATORS.contains(&c));

    if literal {
        term.to_string()
    } else {
        format!("\"{}\"", term.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Built-in field translation; several operations are combined with `bool.must`
pub fn field_values_to_and_query(field: &str, operations: &[FieldOperation]) -> Json {
    let mut queries: Vec<Json> = operations
        .iter()
        .map(|op| field_query(field, op.operator, &op.value))
        .collect();

    if queries.len() == 1 {
        return queries.remove(0);
    }
    json!({ "bool": { "must": queries } })
}

/// Built-in or-field translation: at least one equality must hold
pub fn field_values_to_or_query(field: &str, values: &[Value]) -> Json {
    let should: Vec<Json> = values
        .iter()
        .map(|value| field_query(field, Operator::Eq, value))
        .collect();
    json!({ "bool": { "should": should, "minimum_should_match": 1 } })
}

fn field_query(field: &str, operator: Operator, value: &Value) -> Json {
    if let Value::Date(date) = value {
        let (start, next) = date.range();
        let (bound, instant) = match operator {
            Operator::Eq => {
                return json!({ "range": { field: {
                    "gte": date::print_iso8601(start),
                    "lt": date::print_iso8601(next),
                }}});
            }
            Operator::Gt => ("gte", next),
            Operator::Gte => ("gte", start),
            Operator::Lt => ("lt", start),
            Operator::Lte => ("lt", next),
        };
        return json!({ "range": { field: { bound: date::print_iso8601(instant) } } });
    }

    match (operator, value) {
        (Operator::Eq, Value::String(s)) if s.chars().any(char::is_whitespace) => {
            json!({ "match_phrase": { field: s } })
        }
        (Operator::Eq, Value::String(s)) => {
            json!({ "match": { field: { "query": s, "operator": "and" } } })
        }
        (Operator::Eq, value) => json!({ "term": { field: value.to_json() } }),
        (operator, value) => json!({ "range": { field: { operator.name(): value.to_json() } } }),
    }
}
