//! Search Query Engine
//!
//! A small search-bar query language:
//!
//! - **AST**: immutable clause list with builder operations
//! - **Syntax**: parser and printer (text ⇄ AST)
//! - **Facade**: the [`Query`] entry point
//! - **Executor**: filter in-memory JSON records
//! - **DSL / Query string**: compile for a remote search engine
//!
//! # Query Language
//!
//! ```text
//! laptop "gaming mouse"       free text
//! status:active age>=18       field comparisons (: > >= < <=)
//! color:(red or blue)         any of several values
//! is:open -is:archived        flags
//! -refurbished                leading '-' negates any clause
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use searchql::query::{DslOptions, ExecuteOptions, Query};
//!
//! let query = Query::parse("age>=18 -is:banned")?;
//! let adults = Query::execute(&query, &records, &ExecuteOptions::default())?;
//! let dsl = Query::to_query_dsl(&query, &DslOptions::new().default_fields(["name"]))?;
//! ```

mod ast;
mod dsl;
mod error;
mod executor;
mod facade;
mod parser;
mod printer;
mod query_string;
mod syntax;

pub use ast::{Ast, Clause, Operator, Value};
pub use dsl::{
    to_query_dsl, DslOptions, FieldOperation, FieldValuesToAndQuery, FieldValuesToOrQuery,
    IsToQuery, TermValuesToQuery,
};
pub use error::{
    HookError, Location, ParseErrors, ParseMessage, Position, QueryError, QueryResult,
    DIAGNOSTIC_SOURCE,
};
pub use executor::{execute, matches_clause, ExecuteOptions, IsClauseMatcher, EXPLAIN_KEY};
pub use facade::{Query, QuerySource, MATCH_ALL};
pub use parser::{parse_partial, parse_query};
pub use printer::{print_clause, print_query};
pub use query_string::to_query_string;
pub use syntax::{DefaultSyntax, FieldType, ParseOptions, Schema, Syntax, ValueTyping};
