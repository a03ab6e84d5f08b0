//! Query Abstract Syntax Tree
//!
//! A query is a flat, ordered list of clauses that are implicitly AND-ed
//! together. The tree is immutable: every transformation returns a new
//! [`Ast`]. Clauses are reference counted, so a derived AST copies only its
//! list of clause pointers and shares every clause it did not touch.
//!
//! # Clause Kinds
//!
//! ```text
//! laptop                  Term     free text, matched against default fields
//! status:active           Field    field, operator, value
//! age>=18                 Field    with a comparison operator
//! color:(red or blue)     OrField  field equals any of the values
//! is:archived             Is       boolean flag
//! -status:active          any clause with a leading '-' is a must-not clause
//! ```

use crate::date::{self, DateValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Comparison operators for field clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Equal to
    Eq,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
}

impl Operator {
    /// Every operator, in the order the parser tries their sigils
    pub const ALL: [Operator; 5] = [Self::Gte, Self::Lte, Self::Gt, Self::Lt, Self::Eq];

    /// The sigil that introduces this operator in query text
    pub fn sigil(&self) -> &'static str {
        match self {
            Self::Eq => ":",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    /// Parse from a sigil
    pub fn from_sigil(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.sigil() == s)
    }

    /// Parse from a name (`eq`, `gt`, `gte`, `lt`, `lte`)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }

    /// Lowercase name, as used for range query bounds
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sigil())
    }
}

/// A clause value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Text value
    String(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Granularity-tagged date value
    Date(DateValue),
}

impl Value {
    /// Borrow the text of a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JSON primitive; dates become ISO 8601 strings
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Date(d) => serde_json::Value::String(date::print_iso8601(d.instant())),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Date(d) => write!(f, "{}", date::print(d, None)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateValue> for Value {
    fn from(d: DateValue) -> Self {
        Self::Date(d)
    }
}

/// One filter condition of a query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Clause {
    /// Free text matched against the default fields
    Term { value: String, must: bool },
    /// A single field comparison
    Field {
        field: String,
        operator: Operator,
        value: Value,
        must: bool,
    },
    /// Field equals any of the values
    OrField {
        field: String,
        values: Vec<Value>,
        must: bool,
    },
    /// Boolean flag
    Is { flag: String, must: bool },
}

impl Clause {
    pub fn term(value: impl Into<String>, must: bool) -> Self {
        Self::Term {
            value: value.into(),
            must,
        }
    }

    pub fn field(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
        must: bool,
    ) -> Self {
        Self::Field {
            field: field.into(),
            operator,
            value: value.into(),
            must,
        }
    }

    pub fn or_field(field: impl Into<String>, values: Vec<Value>, must: bool) -> Self {
        Self::OrField {
            field: field.into(),
            values,
            must,
        }
    }

    /// `is:flag`
    pub fn must_is(flag: impl Into<String>) -> Self {
        Self::Is {
            flag: flag.into(),
            must: true,
        }
    }

    /// `-is:flag`
    pub fn must_not_is(flag: impl Into<String>) -> Self {
        Self::Is {
            flag: flag.into(),
            must: false,
        }
    }

    /// Whether this clause must hold (as opposed to must not hold)
    pub fn is_must(&self) -> bool {
        match self {
            Self::Term { must, .. }
            | Self::Field { must, .. }
            | Self::OrField { must, .. }
            | Self::Is { must, .. } => *must,
        }
    }

    pub fn is_term(&self) -> bool {
        matches!(self, Self::Term { .. })
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Self::Field { .. })
    }

    pub fn is_or_field(&self) -> bool {
        matches!(self, Self::OrField { .. })
    }

    pub fn is_is(&self) -> bool {
        matches!(self, Self::Is { .. })
    }

    /// Field name of field and or-field clauses
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field { field, .. } | Self::OrField { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Short kind name (`term`, `field`, `or_field`, `is`)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Term { .. } => "term",
            Self::Field { .. } => "field",
            Self::OrField { .. } => "or_field",
            Self::Is { .. } => "is",
        }
    }

    fn is_simple_field(&self, name: &str, wanted: Option<&Value>) -> bool {
        match self {
            Self::Field { field, value, .. } => {
                field == name && wanted.map(|w| w == value).unwrap_or(true)
            }
            _ => false,
        }
    }

    fn is_or_field_for(&self, name: &str, wanted: Option<&Value>) -> bool {
        match self {
            Self::OrField { field, values, .. } => {
                field == name && wanted.map(|w| values.contains(w)).unwrap_or(true)
            }
            _ => false,
        }
    }

    fn is_flag(&self, name: &str) -> bool {
        matches!(self, Self::Is { flag, .. } if flag == name)
    }
}

/// The root of a parsed query: an ordered list of AND-ed clauses
#[derive(Debug, Clone, Default)]
pub struct Ast {
    clauses: Vec<Arc<Clause>>,
}

impl Ast {
    /// The empty query, which matches everything
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an AST by adding each clause in turn (set semantics apply)
    pub fn from_clauses(clauses: impl IntoIterator<Item = Clause>) -> Self {
        clauses
            .into_iter()
            .fold(Self::empty(), |ast, clause| ast.add_clause(clause))
    }

    /// Clauses in insertion order
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> + '_ {
        self.clauses.iter().map(|c| &**c)
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether both ASTs hold the same clauses, ignoring order
    pub fn same_clauses(&self, other: &Ast) -> bool {
        self.len() == other.len()
            && self.clauses().all(|c| other.clauses().any(|o| o == c))
            && other.clauses().all(|o| self.clauses().any(|c| c == o))
    }

    pub fn term_clauses(&self) -> impl Iterator<Item = &Clause> + '_ {
        self.clauses().filter(|c| c.is_term())
    }

    pub fn is_clauses(&self) -> impl Iterator<Item = &Clause> + '_ {
        self.clauses().filter(|c| c.is_is())
    }

    /// Field clauses, optionally restricted to one field
    pub fn field_clauses<'a>(
        &'a self,
        field: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Clause> + 'a {
        self.clauses()
            .filter(move |c| c.is_field() && (field.is_none() || c.field_name() == field))
    }

    /// Add a clause
    ///
    /// Adding a clause that is already present is a no-op. An `is` clause
    /// replaces any existing clause for the same flag, whatever its polarity.
    pub fn add_clause(&self, clause: Clause) -> Ast {
        if let Clause::Is { flag, .. } = &clause {
            let mut ast = self.without(|c| c.is_flag(flag));
            ast.clauses.push(Arc::new(clause));
            return ast;
        }
        if self.clauses().any(|c| *c == clause) {
            return self.clone();
        }
        let mut clauses = self.clauses.clone();
        clauses.push(Arc::new(clause));
        Ast { clauses }
    }

    pub fn has_simple_field_clause(&self, field: &str, value: Option<&Value>) -> bool {
        self.get_simple_field_clause(field, value).is_some()
    }

    /// First field clause for `field` (and `value`, when given)
    pub fn get_simple_field_clause(&self, field: &str, value: Option<&Value>) -> Option<&Clause> {
        self.clauses().find(|c| c.is_simple_field(field, value))
    }

    pub fn add_simple_field_value(
        &self,
        field: &str,
        value: Value,
        must: bool,
        operator: Operator,
    ) -> Ast {
        self.add_clause(Clause::field(field, operator, value, must))
    }

    /// Remove every field clause for `field` with this value, whatever its operator
    pub fn remove_simple_field_value(&self, field: &str, value: &Value) -> Ast {
        self.without(|c| c.is_simple_field(field, Some(value)))
    }

    pub fn remove_simple_field_clauses(&self, field: &str) -> Ast {
        self.without(|c| c.is_simple_field(field, None))
    }

    pub fn has_or_field_clause(&self, field: &str, value: Option<&Value>) -> bool {
        self.get_or_field_clause(field, value).is_some()
    }

    pub fn get_or_field_clause(&self, field: &str, value: Option<&Value>) -> Option<&Clause> {
        self.clauses().find(|c| c.is_or_field_for(field, value))
    }

    /// Grow the or-field clause for `field`, creating it if needed
    ///
    /// `must` only applies to a new clause; an existing one keeps its
    /// position and polarity.
    pub fn add_or_field_value(&self, field: &str, value: Value, must: bool) -> Ast {
        let Some(index) = self.clauses.iter().position(|c| c.is_or_field_for(field, None)) else {
            let mut clauses = self.clauses.clone();
            clauses.push(Arc::new(Clause::or_field(field, vec![value], must)));
            return Ast { clauses };
        };

        let Clause::OrField {
            values,
            must: existing_must,
            ..
        } = &*self.clauses[index]
        else {
            return self.clone();
        };
        if values.contains(&value) {
            return self.clone();
        }

        let mut values = values.clone();
        values.push(value);
        self.replace_at(index, Clause::or_field(field, values, *existing_must))
    }

    /// Shrink the or-field clause for `field`; removing the last value removes the clause
    pub fn remove_or_field_value(&self, field: &str, value: &Value) -> Ast {
        let Some(index) = self
            .clauses
            .iter()
            .position(|c| c.is_or_field_for(field, Some(value)))
        else {
            return self.clone();
        };
        let Clause::OrField { values, must, .. } = &*self.clauses[index] else {
            return self.clone();
        };

        let remaining: Vec<Value> = values.iter().filter(|v| *v != value).cloned().collect();
        if remaining.is_empty() {
            let mut clauses = self.clauses.clone();
            clauses.remove(index);
            return Ast { clauses };
        }
        self.replace_at(index, Clause::or_field(field, remaining, *must))
    }

    pub fn remove_or_field_clauses(&self, field: &str) -> Ast {
        self.without(|c| c.is_or_field_for(field, None))
    }

    pub fn has_is_clause(&self, flag: &str) -> bool {
        self.get_is_clause(flag).is_some()
    }

    pub fn get_is_clause(&self, flag: &str) -> Option<&Clause> {
        self.clauses().find(|c| c.is_flag(flag))
    }

    pub fn add_must_is_clause(&self, flag: &str) -> Ast {
        self.add_clause(Clause::must_is(flag))
    }

    pub fn add_must_not_is_clause(&self, flag: &str) -> Ast {
        self.add_clause(Clause::must_not_is(flag))
    }

    pub fn remove_is_clause(&self, flag: &str) -> Ast {
        self.without(|c| c.is_flag(flag))
    }

    fn without(&self, remove: impl Fn(&Clause) -> bool) -> Ast {
        Ast {
            clauses: self
                .clauses
                .iter()
                .filter(|c| !remove(&***c))
                .cloned()
                .collect(),
        }
    }

    fn replace_at(&self, index: usize, clause: Clause) -> Ast {
        let mut clauses = self.clauses.clone();
        clauses[index] = Arc::new(clause);
        Ast { clauses }
    }
}

impl PartialEq for Ast {
    fn eq(&self, other: &Self) -> bool {
        self.clauses == other.clauses
    }
}

impl Serialize for Ast {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.clauses.len()))?;
        for clause in self.clauses() {
            seq.serialize_element(clause)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ast {
        Ast::from_clauses([
            Clause::term("laptop", true),
            Clause::field("status", Operator::Eq, "active", true),
            Clause::or_field("color", vec!["red".into()], true),
        ])
    }

    #[test]
    fn test_operator_sigils() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_sigil(op.sigil()), Some(op));
            assert_eq!(Operator::from_name(op.name()), Some(op));
        }
        assert_eq!(Operator::from_sigil("="), None);
    }

    #[test]
    fn test_clause_classification() {
        let term = Clause::term("x", true);
        let not_is = Clause::must_not_is("read");

        assert!(term.is_term() && term.is_must());
        assert!(not_is.is_is() && !not_is.is_must());
        assert!(Clause::field("a", Operator::Gt, 1.0, true).is_field());
        assert!(Clause::or_field("a", vec![], false).is_or_field());
        assert_eq!(not_is.kind(), "is");
    }

    #[test]
    fn test_add_field_value_is_idempotent() {
        let ast = sample();
        let again = ast.add_simple_field_value("status", "active".into(), true, Operator::Eq);
        assert_eq!(again, ast);

        let negated = ast.add_simple_field_value("status", "active".into(), false, Operator::Eq);
        assert_eq!(negated.len(), 4);
    }

    #[test]
    fn test_remove_simple_field_value() {
        let ast = sample()
            .add_simple_field_value("age", Value::Number(18.0), true, Operator::Gte)
            .add_simple_field_value("status", "archived".into(), false, Operator::Eq);

        let removed = ast.remove_simple_field_value("status", &"active".into());
        assert!(!removed.has_simple_field_clause("status", Some(&"active".into())));
        assert!(removed.has_simple_field_clause("status", Some(&"archived".into())));

        let cleared = ast.remove_simple_field_clauses("status");
        assert!(!cleared.has_simple_field_clause("status", None));
        assert!(cleared.has_simple_field_clause("age", None));
    }

    #[test]
    fn test_is_clause_builder_symmetry() {
        let ast = sample();
        for flag in ["read", "open", "archived"] {
            let toggled = ast.add_must_is_clause(flag).remove_is_clause(flag);
            assert!(toggled.same_clauses(&ast));
        }
    }

    #[test]
    fn test_is_clause_replaces_polarity() {
        let ast = Ast::empty().add_must_is_clause("read");
        let flipped = ast.add_must_not_is_clause("read");

        assert_eq!(flipped.len(), 1);
        assert!(!flipped.get_is_clause("read").unwrap().is_must());
        assert!(ast.get_is_clause("read").unwrap().is_must());
    }

    #[test]
    fn test_or_field_grows_and_shrinks() {
        let ast = sample().add_or_field_value("color", "blue".into(), true);
        match ast.get_or_field_clause("color", None) {
            Some(Clause::OrField { values, .. }) => {
                assert_eq!(values, &vec![Value::from("red"), Value::from("blue")])
            }
            other => panic!("unexpected clause: {:?}", other),
        }
        assert_eq!(ast.add_or_field_value("color", "blue".into(), true), ast);

        let shrunk = ast.remove_or_field_value("color", &"red".into());
        assert!(shrunk.has_or_field_clause("color", Some(&"blue".into())));
        assert!(!shrunk.has_or_field_clause("color", Some(&"red".into())));

        let gone = shrunk.remove_or_field_value("color", &"blue".into());
        assert!(!gone.has_or_field_clause("color", None));
        assert_eq!(gone.len(), 2);
    }

    #[test]
    fn test_or_field_keeps_polarity() {
        let ast = Ast::empty()
            .add_or_field_value("c", "red".into(), true)
            .add_or_field_value("c", "blue".into(), true);

        assert_eq!(ast.add_or_field_value("c", "red".into(), false), ast);

        let grown = ast.add_or_field_value("c", "green".into(), false);
        match grown.get_or_field_clause("c", None) {
            Some(Clause::OrField { values, must, .. }) => {
                assert!(*must);
                assert_eq!(values, &vec![Value::from("red"), Value::from("blue"), Value::from("green")]);
            }
            other => panic!("expected or-field clause, got {:?}", other),
        }

        let negated = Ast::empty().add_or_field_value("c", "red".into(), false);
        assert!(!negated.get_or_field_clause("c", None).unwrap().is_must());
    }

    #[test]
    fn test_or_field_keeps_position() {
        let ast = sample().add_or_field_value("color", "blue".into(), true);
        assert!(ast.clauses().last().unwrap().is_or_field());
        assert_eq!(ast.remove_or_field_clauses("color").len(), 2);
    }

    #[test]
    fn test_accessors_return_none_when_absent() {
        let ast = Ast::empty();
        assert!(ast.get_simple_field_clause("missing", None).is_none());
        assert!(ast.get_or_field_clause("missing", None).is_none());
        assert!(ast.get_is_clause("missing").is_none());
    }

    #[test]
    fn test_derived_ast_shares_untouched_clauses() {
        let ast = sample();
        let derived = ast.add_must_is_clause("read");

        for (a, b) in ast.clauses.iter().zip(derived.clauses.iter()) {
            assert!(Arc::ptr_eq(a, b));
        }
        assert_eq!(ast.len(), 3);
    }

    #[test]
    fn test_same_clauses_ignores_order() {
        let a = Ast::from_clauses([Clause::term("a", true), Clause::must_is("x")]);
        let b = Ast::from_clauses([Clause::must_is("x"), Clause::term("a", true)]);
        assert!(a.same_clauses(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_ast_serializes_as_clause_list() {
        let ast = Ast::from_clauses([Clause::field("age", Operator::Gte, 18.0, true)]);
        let json = serde_json::to_value(&ast).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "type": "field",
                "field": "age",
                "operator": "gte",
                "value": 18.0,
                "must": true
            }])
        );
    }
}
