//! # searchql
//!
//! A search-bar query language: parse user query text, transform it
//! immutably, run it against in-memory records, or compile it for a remote
//! search engine.
//!
//! ## Features
//!
//! - **Round-trip syntax**: `print(parse(text))` reparses to the same clauses
//! - **Immutable builders**: every edit derives a new query sharing unchanged clauses
//! - **Execution**: filter JSON records in memory
//! - **Compilers**: boolean query DSL objects and query strings
//! - **Dates**: granularity-aware expressions such as `last week` or `March 2024`
//!
//! ## Modules
//!
//! - [`query`]: AST, parser, printer, facade, executor and compilers
//! - [`date`]: date expression parsing and printing
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use searchql::query::{DslOptions, ExecuteOptions, Query};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let query = Query::parse("age>=18 -is:banned")?.add_must_is_clause("verified");
//!
//!     let records = vec![
//!         json!({"name": "ann", "age": 34, "verified": true}),
//!         json!({"name": "bob", "age": 17, "verified": true}),
//!     ];
//!     let adults = Query::execute(&query, &records, &ExecuteOptions::default())?;
//!     println!("{} matches for {}", adults.len(), query);
//!
//!     let dsl = Query::to_query_dsl(&query, &DslOptions::default())?;
//!     println!("{}", dsl);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod date;
pub mod query;

pub use config::{Config, ConfigError, ExecutionConfig, LoggingConfig, ParserConfig};

pub use date::{DateParseError, DateValue, Granularity};

pub use query::{
    Ast, Clause, DslOptions, ExecuteOptions, Operator, ParseErrors, ParseMessage, ParseOptions,
    Query, QueryError, QueryResult, Value, MATCH_ALL,
};
