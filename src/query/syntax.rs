//! Query syntax
//!
//! A [`Syntax`] turns query text into an [`Ast`] and back. The default
//! syntax is the search-bar grammar implemented by the parser and printer
//! modules; callers may plug in their own.

use crate::query::ast::{Ast, Operator};
use crate::query::error::ParseErrors;
use crate::query::{parser, printer};
use serde::Deserialize;
use std::collections::HashMap;

/// Declared type of a field, driving how its values are parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
}

/// Field declarations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Reject fields that are not declared
    pub strict: bool,
    pub fields: HashMap<String, FieldType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: make undeclared fields a parse error
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builder method: declare a field
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }
}

/// How values of undeclared fields are typed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueTyping {
    /// `true`/`false` become booleans, decimal literals become numbers
    #[default]
    Infer,
    /// Keep the raw text
    String,
}

impl ValueTyping {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "infer" => Some(Self::Infer),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

/// Options accepted by [`Syntax::parse`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub schema: Option<Schema>,
    /// Permissible operators; `None` allows all of them
    pub operators: Option<Vec<Operator>>,
    pub phrase_delimiter: char,
    pub value_typing: ValueTyping,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            schema: None,
            operators: None,
            phrase_delimiter: '"',
            value_typing: ValueTyping::Infer,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the schema
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Builder method: restrict the permissible operators
    pub fn operators(mut self, operators: &[Operator]) -> Self {
        self.operators = Some(operators.to_vec());
        self
    }

    /// Builder method: set the phrase delimiter
    pub fn phrase_delimiter(mut self, delimiter: char) -> Self {
        self.phrase_delimiter = delimiter;
        self
    }

    /// Builder method: set how undeclared field values are typed
    pub fn value_typing(mut self, typing: ValueTyping) -> Self {
        self.value_typing = typing;
        self
    }

    pub(crate) fn allows(&self, operator: Operator) -> bool {
        self.operators
            .as_ref()
            .map(|ops| ops.contains(&operator))
            .unwrap_or(true)
    }
}

/// Text ⇄ AST conversion
pub trait Syntax: Send + Sync {
    /// Parse query text into an AST
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<Ast, ParseErrors>;

    /// Print an AST back to query text
    fn print(&self, ast: &Ast) -> String;
}

/// The search-bar grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSyntax;

impl Syntax for DefaultSyntax {
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<Ast, ParseErrors> {
        parser::parse_query(text, options)
    }

    fn print(&self, ast: &Ast) -> String {
        printer::print_query(ast)
    }
}
