//! Query Facade
//!
//! [`Query`] is the public entry point: an immutable wrapper pairing an
//! [`Ast`] with the [`Syntax`] that prints it. Every builder method returns
//! a new `Query`; the text form is computed lazily and cached.
//!
//! # Examples
//!
//! ```text
//! let query = Query::parse("status:active")?
//!     .add_must_is_clause("read")
//!     .add_or_field_value("color", "red".into(), true);
//! assert_eq!(query.text(), "status:active is:read color:(red)");
//!
//! let matches = Query::execute(&query, &records, &ExecuteOptions::default())?;
//! let dsl = Query::to_query_dsl("age>=18", &DslOptions::default())?;
//! ```

use crate::query::ast::{Ast, Clause, Operator, Value};
use crate::query::dsl::{self, DslOptions};
use crate::query::error::QueryResult;
use crate::query::executor::{self, ExecuteOptions};
use crate::query::query_string;
use crate::query::syntax::{DefaultSyntax, ParseOptions, Syntax};
use std::sync::{Arc, LazyLock, OnceLock};

/// The empty query: matches every item and compiles to an unfiltered query
pub static MATCH_ALL: LazyLock<Query> = LazyLock::new(|| Query::from_ast(Ast::empty()));

/// Query text or an already parsed query
#[derive(Debug, Clone, Copy)]
pub enum QuerySource<'a> {
    Text(&'a str),
    Query(&'a Query),
}

impl<'a> From<&'a str> for QuerySource<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for QuerySource<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a Query> for QuerySource<'a> {
    fn from(query: &'a Query) -> Self {
        Self::Query(query)
    }
}

impl QuerySource<'_> {
    fn into_ast(self) -> QueryResult<Arc<Ast>> {
        match self {
            Self::Text(text) => Ok(Query::parse(text)?.ast),
            Self::Query(query) => Ok(query.ast.clone()),
        }
    }
}

/// An immutable, parsed search query
#[derive(Clone)]
pub struct Query {
    ast: Arc<Ast>,
    syntax: Arc<dyn Syntax>,
    text: OnceLock<String>,
}

impl Query {
    /// Parse with the default options and syntax
    pub fn parse(text: &str) -> QueryResult<Query> {
        Self::parse_with(text, &ParseOptions::default())
    }

    /// Parse with the default syntax
    pub fn parse_with(text: &str, options: &ParseOptions) -> QueryResult<Query> {
        Self::parse_with_syntax(text, options, Arc::new(DefaultSyntax))
    }

    /// Parse with a caller-supplied syntax
    pub fn parse_with_syntax(
        text: &str,
        options: &ParseOptions,
        syntax: Arc<dyn Syntax>,
    ) -> QueryResult<Query> {
        let ast = syntax.parse(text, options)?;
        Ok(Query {
            ast: Arc::new(ast),
            syntax,
            text: OnceLock::from(text.to_string()),
        })
    }

    /// Wrap an AST built elsewhere
    pub fn from_ast(ast: Ast) -> Query {
        Self::from_ast_with_syntax(ast, Arc::new(DefaultSyntax))
    }

    pub fn from_ast_with_syntax(ast: Ast, syntax: Arc<dyn Syntax>) -> Query {
        Query {
            ast: Arc::new(ast),
            syntax,
            text: OnceLock::new(),
        }
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Query text; printed on first use when the query was built rather than parsed
    pub fn text(&self) -> &str {
        self.text.get_or_init(|| self.syntax.print(&self.ast))
    }

    pub fn is_must(clause: &Clause) -> bool {
        clause.is_must()
    }

    pub fn is_term(clause: &Clause) -> bool {
        clause.is_term()
    }

    pub fn is_is(clause: &Clause) -> bool {
        clause.is_is()
    }

    pub fn is_field(clause: &Clause) -> bool {
        clause.is_field()
    }

    /// Filter `items` with a query or query text
    pub fn execute<'a>(
        query: impl Into<QuerySource<'a>>,
        items: &[serde_json::Value],
        options: &ExecuteOptions,
    ) -> QueryResult<Vec<serde_json::Value>> {
        let ast = query.into().into_ast()?;
        Ok(executor::execute(&ast, items, options))
    }

    /// Compile a query or query text into the search engine's query object
    pub fn to_query_dsl<'a>(
        query: impl Into<QuerySource<'a>>,
        options: &DslOptions,
    ) -> QueryResult<serde_json::Value> {
        let ast = query.into().into_ast()?;
        dsl::to_query_dsl(&ast, options)
    }

    /// Compile a query or query text into a query string
    pub fn to_query_string<'a>(query: impl Into<QuerySource<'a>>) -> QueryResult<String> {
        let ast = query.into().into_ast()?;
        Ok(query_string::to_query_string(&ast))
    }

    pub fn has_simple_field_clause(&self, field: &str, value: Option<&Value>) -> bool {
        self.ast.has_simple_field_clause(field, value)
    }

    pub fn get_simple_field_clause(&self, field: &str, value: Option<&Value>) -> Option<&Clause> {
        self.ast.get_simple_field_clause(field, value)
    }

    pub fn has_or_field_clause(&self, field: &str, value: Option<&Value>) -> bool {
        self.ast.has_or_field_clause(field, value)
    }

    pub fn get_or_field_clause(&self, field: &str, value: Option<&Value>) -> Option<&Clause> {
        self.ast.get_or_field_clause(field, value)
    }

    pub fn has_is_clause(&self, flag: &str) -> bool {
        self.ast.has_is_clause(flag)
    }

    pub fn get_is_clause(&self, flag: &str) -> Option<&Clause> {
        self.ast.get_is_clause(flag)
    }

    pub fn add_clause(&self, clause: Clause) -> Query {
        self.derive(self.ast.add_clause(clause))
    }

    pub fn add_simple_field_value(
        &self,
        field: &str,
        value: Value,
        must: bool,
        operator: Operator,
    ) -> Query {
        self.derive(self.ast.add_simple_field_value(field, value, must, operator))
    }

    pub fn remove_simple_field_value(&self, field: &str, value: &Value) -> Query {
        self.derive(self.ast.remove_simple_field_value(field, value))
    }

    pub fn remove_simple_field_clauses(&self, field: &str) -> Query {
        self.derive(self.ast.remove_simple_field_clauses(field))
    }

    pub fn add_or_field_value(&self, field: &str, value: Value, must: bool) -> Query {
        self.derive(self.ast.add_or_field_value(field, value, must))
    }

    pub fn remove_or_field_value(&self, field: &str, value: &Value) -> Query {
        self.derive(self.ast.remove_or_field_value(field, value))
    }

    pub fn remove_or_field_clauses(&self, field: &str) -> Query {
        self.derive(self.ast.remove_or_field_clauses(field))
    }

    pub fn add_must_is_clause(&self, flag: &str) -> Query {
        self.derive(self.ast.add_must_is_clause(flag))
    }

    pub fn add_must_not_is_clause(&self, flag: &str) -> Query {
        self.derive(self.ast.add_must_not_is_clause(flag))
    }

    pub fn remove_is_clause(&self, flag: &str) -> Query {
        self.derive(self.ast.remove_is_clause(flag))
    }

    fn derive(&self, ast: Ast) -> Query {
        Query {
            ast: Arc::new(ast),
            syntax: self.syntax.clone(),
            text: OnceLock::new(),
        }
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.ast == other.ast
    }
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("ast", &self.ast)
            .field("text", &self.text.get())
            .finish()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::error::{ParseErrors, QueryError};
    use serde_json::json;

    #[test]
    fn test_match_all() {
        assert!(MATCH_ALL.ast().is_empty());
        assert_eq!(MATCH_ALL.text(), "");

        let items = vec![json!({"a": 1}), json!({"b": 2})];
        let matched = Query::execute(&*MATCH_ALL, &items, &ExecuteOptions::default()).unwrap();
        assert_eq!(matched, items);
        assert_eq!(
            Query::to_query_dsl(&*MATCH_ALL, &DslOptions::default()).unwrap(),
            json!({ "match_all": {} })
        );
        assert_eq!(Query::to_query_string(&*MATCH_ALL).unwrap(), "*");
    }

    #[test]
    fn test_parsed_query_keeps_its_text() {
        let query = Query::parse("  age>=18   is:read ").unwrap();
        assert_eq!(query.text(), "  age>=18   is:read ");
        assert!(query.has_is_clause("read"));
    }

    #[test]
    fn test_builders_recompute_text() {
        let query = Query::parse("status:active").unwrap();
        let built = query
            .add_must_is_clause("read")
            .add_or_field_value("color", "red".into(), true)
            .add_simple_field_value("age", Value::Number(18.0), false, Operator::Gt);

        assert_eq!(built.text(), "status:active is:read color:(red) -age>18");
        assert_eq!(query.text(), "status:active");

        let removed = built.remove_is_clause("read").remove_or_field_clauses("color");
        assert_eq!(removed.text(), "status:active -age>18");
        assert_eq!(removed.remove_simple_field_clauses("age"), query);
    }

    #[test]
    fn test_static_helpers_accept_text_or_query() {
        let items = vec![json!({"age": 17}), json!({"age": 18}), json!({"age": 30})];
        let from_text = Query::execute("age>=18", &items, &ExecuteOptions::default()).unwrap();

        let query = Query::parse("age>=18").unwrap();
        let from_query = Query::execute(&query, &items, &ExecuteOptions::default()).unwrap();
        assert_eq!(from_text, from_query);
        assert_eq!(from_text.len(), 2);

        assert_eq!(Query::to_query_string("age>=18").unwrap(), "age:>=18");
    }

    #[test]
    fn test_invalid_text_surfaces_diagnostics() {
        match Query::to_query_string("color:(red") {
            Err(QueryError::Parse(ParseErrors(messages))) => {
                assert_eq!(messages[0].rule_id, "unclosed-group")
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_classification_helpers() {
        let query = Query::parse("-is:sold laptop price:5").unwrap();
        let clauses: Vec<&Clause> = query.ast().clauses().collect();
        assert!(Query::is_is(clauses[0]) && !Query::is_must(clauses[0]));
        assert!(Query::is_term(clauses[1]) && Query::is_must(clauses[1]));
        assert!(Query::is_field(clauses[2]));
    }

    struct CommaSyntax;

    impl Syntax for CommaSyntax {
        fn parse(&self, text: &str, _options: &ParseOptions) -> Result<Ast, ParseErrors> {
            Ok(Ast::from_clauses(
                text.split(',')
                    .filter(|t| !t.is_empty())
                    .map(|t| Clause::term(t, true)),
            ))
        }

        fn print(&self, ast: &Ast) -> String {
            ast.term_clauses()
                .filter_map(|c| match c {
                    Clause::Term { value, .. } => Some(value.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(",")
        }
    }

    #[test]
    fn test_custom_syntax() {
        let query =
            Query::parse_with_syntax("a,b", &ParseOptions::default(), Arc::new(CommaSyntax)).unwrap();
        assert_eq!(query.ast().len(), 2);

        let extended = query.add_clause(Clause::term("c d", true));
        assert_eq!(extended.text(), "a,b,c d");
    }
}
