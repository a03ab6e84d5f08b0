//! Query error types
//!
//! Parse failures are reported as a list of positioned diagnostics rather
//! than a single error, so a caller can highlight every problem in the
//! query text at once.

use serde::Serialize;
use thiserror::Error;

/// Source name attached to every parse diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "search-query";

/// Error type returned by caller-supplied compiler hooks
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// A point in the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Byte offset from the start of the input
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Position {
    /// Resolve a byte offset into line and column
    pub fn at(input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = input.get(..offset).unwrap_or(input);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Start and end of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

/// One parse diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMessage {
    pub message: String,
    /// `line:column-line:column`
    pub name: String,
    pub reason: String,
    pub line: usize,
    pub column: usize,
    pub location: Location,
    pub source: String,
    pub rule_id: String,
    pub fatal: bool,
}

impl ParseMessage {
    /// Create a fatal diagnostic covering `start..end` of `input`
    pub fn new(
        input: &str,
        start: usize,
        end: usize,
        rule_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let start = Position::at(input, start);
        let end = Position::at(input, end.max(start.offset));
        Self {
            name: format!(
                "{}:{}-{}:{}",
                start.line, start.column, end.line, end.column
            ),
            reason: message.clone(),
            message,
            line: start.line,
            column: start.column,
            location: Location { start, end },
            source: DIAGNOSTIC_SOURCE.to_string(),
            rule_id: rule_id.into(),
            fatal: true,
        }
    }
}

impl std::fmt::Display for ParseMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// A non-empty list of parse diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParseErrors(pub Vec<ParseMessage>);

impl ParseErrors {
    pub fn messages(&self) -> &[ParseMessage] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|m| m.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ParseErrors {}

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Query text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseErrors),

    /// A caller-supplied compiler hook failed
    #[error(transparent)]
    Hook(HookError),

    /// Output could not be serialised
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Serialization(err.to_string())
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
