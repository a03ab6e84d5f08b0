//! Query Parser
//!
//! Parses search-bar query text into an [`Ast`].
//!
//! # Supported Syntax
//!
//! ```text
//! laptop "gaming mouse"          free-text terms (quotes keep whitespace)
//! status:active                  field equals value
//! age>18 age>=18 age<65 age<=65  comparisons
//! color:(red or blue)            field equals any of the values
//! is:open -is:archived           boolean flags
//! -status:active -laptop         leading '-' negates a clause
//! ```
//!
//! Parsing recovers from malformed clauses: each problem is recorded as a
//! [`ParseMessage`] and parsing resumes at the next whitespace.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, tag_no_case, take_while, take_while1},
    character::complete::{anychar, char, digit1, multispace0, multispace1},
    combinator::{all_consuming, eof, map, opt, peek, recognize, value, verify},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::date;
use crate::query::ast::{Ast, Clause, Operator, Value};
use crate::query::error::{ParseErrors, ParseMessage};
use crate::query::syntax::{FieldType, ParseOptions, ValueTyping};

/// A value as written, before typing
#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Word(String),
    Phrase(String),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            Self::Word(s) | Self::Phrase(s) => s,
        }
    }
}

/// A clause as written, before validation against the options
#[derive(Debug, Clone, PartialEq)]
enum RawClause {
    Is(String),
    Field {
        field: String,
        operator: Operator,
        value: RawValue,
    },
    Group {
        field: String,
        values: Vec<RawValue>,
    },
    /// `field:` or `field>=` with nothing after it
    MissingValue {
        field: String,
        operator: Operator,
    },
    Term(RawValue),
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    negated: bool,
    clause: RawClause,
}

/// A diagnostic before it is positioned
type Rejection = (&'static str, String);

/// Parse query text, failing with every diagnostic found
pub fn parse_query(input: &str, options: &ParseOptions) -> Result<Ast, ParseErrors> {
    let (ast, messages) = parse_partial(input, options);
    if messages.is_empty() {
        Ok(ast)
    } else {
        Err(ParseErrors(messages))
    }
}

/// Parse query text, returning the recovered AST alongside any diagnostics
pub fn parse_partial(input: &str, options: &ParseOptions) -> (Ast, Vec<ParseMessage>) {
    let delimiter = options.phrase_delimiter;
    let mut ast = Ast::empty();
    let mut messages = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let start = input.len() - rest.len();

        match clause(delimiter)(rest) {
            Ok((remaining, token))
                if remaining.is_empty() || remaining.starts_with(char::is_whitespace) =>
            {
                let end = input.len() - remaining.len();
                match resolve(token, options) {
                    Ok(clause) => ast = ast.add_clause(clause),
                    Err((rule, message)) => {
                        messages.push(ParseMessage::new(input, start, end, rule, message))
                    }
                }
                rest = remaining;
            }
            _ => {
                let (rule, message, len) = classify_failure(rest, delimiter);
                messages.push(ParseMessage::new(input, start, start + len, rule, message));
                rest = &rest[len..];
            }
        }
    }

    tracing::debug!(
        clauses = ast.len(),
        diagnostics = messages.len(),
        "Parsed query"
    );
    (ast, messages)
}

/// Infer the type of an unquoted value of an undeclared field
pub(crate) fn infer_value(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if all_consuming(parse_number)(text).is_ok() {
        if let Ok(n) = text.parse::<f64>() {
            return Value::Number(n);
        }
    }
    Value::String(text.to_string())
}

/// Parse a single clause, with its optional negation
fn clause(delimiter: char) -> impl FnMut(&str) -> IResult<&str, Token> {
    move |input| {
        let (input, negated) = map(opt(char('-')), |n| n.is_some())(input)?;
        let (input, clause) = alt((
            map(preceded(tag_no_case("is:"), parse_flag), |flag| {
                RawClause::Is(flag.to_string())
            }),
            field_group(delimiter),
            field_value(delimiter),
            missing_value,
            map(raw_value(delimiter), RawClause::Term),
        ))(input)?;
        Ok((input, Token { negated, clause }))
    }
}

/// Parse `field:(a or b or c)`
fn field_group(delimiter: char) -> impl FnMut(&str) -> IResult<&str, RawClause> {
    move |input| {
        let (input, field) = parse_field_name(input)?;
        let (input, _) = char(':')(input)?;
        let (input, values) = delimited(
            pair(char('('), multispace0),
            separated_list1(
                delimited(multispace1, tag_no_case("or"), multispace1),
                raw_value(delimiter),
            ),
            pair(multispace0, char(')')),
        )(input)?;

        Ok((
            input,
            RawClause::Group {
                field: field.to_string(),
                values,
            },
        ))
    }
}

/// Parse `field<op>value`
fn field_value(delimiter: char) -> impl FnMut(&str) -> IResult<&str, RawClause> {
    move |input| {
        let (input, (field, operator, value)) =
            tuple((parse_field_name, parse_operator, raw_value(delimiter)))(input)?;
        Ok((
            input,
            RawClause::Field {
                field: field.to_string(),
                operator,
                value,
            },
        ))
    }
}

/// Recognise `field<op>` followed by whitespace or end of input
fn missing_value(input: &str) -> IResult<&str, RawClause> {
    let (input, (field, operator)) = terminated(
        pair(parse_field_name, parse_operator),
        peek(alt((eof, multispace1))),
    )(input)?;
    Ok((
        input,
        RawClause::MissingValue {
            field: field.to_string(),
            operator,
        },
    ))
}

/// Parse a quoted phrase or a bare word
fn raw_value(delimiter: char) -> impl FnMut(&str) -> IResult<&str, RawValue> {
    move |input| {
        alt((
            map(parse_phrase(delimiter), RawValue::Phrase),
            map(parse_word(delimiter), RawValue::Word),
        ))(input)
    }
}

/// Parse a delimited phrase; `\` escapes the next character
fn parse_phrase(delimiter: char) -> impl FnMut(&str) -> IResult<&str, String> {
    let stop = format!("{delimiter}\\");
    move |input| {
        delimited(
            char(delimiter),
            map(
                opt(escaped_transform(is_not(stop.as_str()), '\\', anychar)),
                Option::unwrap_or_default,
            ),
            char(delimiter),
        )(input)
    }
}

/// Parse a bare word; `\` escapes the next character
fn parse_word(delimiter: char) -> impl FnMut(&str) -> IResult<&str, String> {
    let stop = format!(" \t\r\n(){delimiter}\\");
    move |input| {
        verify(
            escaped_transform(is_not(stop.as_str()), '\\', anychar),
            |s: &str| !s.is_empty(),
        )(input)
    }
}

/// Parse comparison operator
fn parse_operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::Gte, tag(">=")),
        value(Operator::Lte, tag("<=")),
        value(Operator::Gt, tag(">")),
        value(Operator::Lt, tag("<")),
        value(Operator::Eq, tag(":")),
    ))(input)
}

/// Parse field name
fn parse_field_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '-')),
    ))(input)
}

/// Parse flag name
fn parse_flag(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))(input)
}

/// Parse decimal literal
fn parse_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)
}

/// Validate a raw clause against the options and type its values
fn resolve(token: Token, options: &ParseOptions) -> Result<Clause, Rejection> {
    let must = !token.negated;
    match token.clause {
        RawClause::Is(flag) => Ok(Clause::Is { flag, must }),
        RawClause::Term(value) => Ok(Clause::term(value.into_text(), must)),
        RawClause::MissingValue { field, operator } => Err((
            "missing-value",
            format!("expected a value after '{}{}'", field, operator),
        )),
        RawClause::Field {
            field,
            operator,
            value,
        } => {
            check_field(&field, operator, options)?;
            let value = resolve_value(&field, value, options)?;
            Ok(Clause::field(field, operator, value, must))
        }
        RawClause::Group { field, values } => {
            check_field(&field, Operator::Eq, options)?;
            let values = values
                .into_iter()
                .map(|v| resolve_value(&field, v, options))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Clause::or_field(field, values, must))
        }
    }
}

fn check_field(field: &str, operator: Operator, options: &ParseOptions) -> Result<(), Rejection> {
    if field.eq_ignore_ascii_case("is") {
        return Err(("invalid-flag", "'is' expects a single flag name".to_string()));
    }
    if let Some(schema) = &options.schema {
        if schema.strict && schema.field_type(field).is_none() {
            return Err(("unknown-field", format!("unknown field '{}'", field)));
        }
    }
    if !options.allows(operator) {
        return Err((
            "operator-not-allowed",
            format!("operator '{}' is not allowed", operator),
        ));
    }
    Ok(())
}

fn resolve_value(field: &str, raw: RawValue, options: &ParseOptions) -> Result<Value, Rejection> {
    let field_type = options
        .schema
        .as_ref()
        .and_then(|schema| schema.field_type(field));

    match field_type {
        Some(FieldType::String) => Ok(Value::String(raw.into_text())),
        Some(FieldType::Number) => {
            let text = raw.into_text();
            text.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number)
                .ok_or_else(|| {
                    (
                        "invalid-value",
                        format!("expected a number for field '{}', found '{}'", field, text),
                    )
                })
        }
        Some(FieldType::Boolean) => {
            let text = raw.into_text();
            match text.to_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err((
                    "invalid-value",
                    format!("expected true or false for field '{}', found '{}'", field, text),
                )),
            }
        }
        Some(FieldType::Date) => date::parse(&raw.into_text())
            .map(Value::Date)
            .map_err(|e| ("invalid-date", e.to_string())),
        None => match raw {
            RawValue::Phrase(text) => Ok(Value::String(text)),
            RawValue::Word(text) => Ok(match options.value_typing {
                ValueTyping::Infer => infer_value(&text),
                ValueTyping::String => Value::String(text),
            }),
        },
    }
}

/// Describe why no clause could be parsed at `rest`; returns the span to skip
fn classify_failure(rest: &str, delimiter: char) -> (&'static str, String, usize) {
    let token_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let token = &rest[..token_len];

    if token.contains(delimiter) && unescaped_count(rest, delimiter) % 2 == 1 {
        return (
            "unterminated-phrase",
            format!("unterminated phrase, expected a closing {}", delimiter),
            rest.len(),
        );
    }
    if token.contains('(') {
        return match rest.find(')') {
            None => (
                "unclosed-group",
                "unclosed group, expected ')'".to_string(),
                rest.len(),
            ),
            Some(close) => {
                let after = close + 1;
                let len = after
                    + rest[after..]
                        .find(char::is_whitespace)
                        .unwrap_or(rest.len() - after);
                (
                    "malformed-group",
                    format!(
                        "malformed group '{}', expected field:(value or value)",
                        &rest[..len]
                    ),
                    len,
                )
            }
        };
    }

    let len = if token.is_empty() {
        rest.chars().next().map(char::len_utf8).unwrap_or(rest.len())
    } else {
        token_len
    };
    (
        "unexpected-input",
        format!("unexpected input '{}'", &rest[..len]),
        len,
    )
}

fn unescaped_count(text: &str, delimiter: char) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delimiter {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::syntax::Schema;

    fn parse(text: &str) -> Ast {
        parse_query(text, &ParseOptions::default()).unwrap()
    }

    fn only(ast: &Ast) -> Clause {
        assert_eq!(ast.len(), 1, "expected a single clause in {:?}", ast);
        ast.clauses().next().unwrap().clone()
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
        assert!(parse("   \n ").is_empty());
    }

    #[test]
    fn test_parse_terms() {
        let ast = parse("gaming \"wireless mouse\" -refurbished");
        let clauses: Vec<Clause> = ast.clauses().cloned().collect();
        assert_eq!(
            clauses,
            vec![
                Clause::term("gaming", true),
                Clause::term("wireless mouse", true),
                Clause::term("refurbished", false),
            ]
        );
    }

    #[test]
    fn test_parse_field_operators() {
        let cases = [
            ("age:18", Operator::Eq),
            ("age>18", Operator::Gt),
            ("age>=18", Operator::Gte),
            ("age<18", Operator::Lt),
            ("age<=18", Operator::Lte),
        ];
        for (text, operator) in cases {
            assert_eq!(
                only(&parse(text)),
                Clause::field("age", operator, 18.0, true),
                "parsing {text}"
            );
        }
    }

    #[test]
    fn test_parse_value_inference() {
        assert_eq!(
            only(&parse("active:true")),
            Clause::field("active", Operator::Eq, true, true)
        );
        assert_eq!(
            only(&parse("code:\"42\"")),
            Clause::field("code", Operator::Eq, "42", true)
        );
        assert_eq!(
            only(&parse("price<-1.5")),
            Clause::field("price", Operator::Lt, -1.5, true)
        );
        assert_eq!(
            only(&parse("name:v1.2.3")),
            Clause::field("name", Operator::Eq, "v1.2.3", true)
        );
    }

    #[test]
    fn test_string_typing_keeps_raw_text() {
        let options = ParseOptions::new().value_typing(ValueTyping::String);
        let ast = parse_query("age:18", &options).unwrap();
        assert_eq!(only(&ast), Clause::field("age", Operator::Eq, "18", true));
    }

    #[test]
    fn test_parse_negated_field() {
        assert_eq!(
            only(&parse("-status:archived")),
            Clause::field("status", Operator::Eq, "archived", false)
        );
    }

    #[test]
    fn test_parse_or_group() {
        let clause = only(&parse("color:(red or \"dark blue\" OR 3)"));
        assert_eq!(
            clause,
            Clause::or_field(
                "color",
                vec!["red".into(), "dark blue".into(), Value::Number(3.0)],
                true
            )
        );

        let negated = only(&parse("-color:( red )"));
        assert_eq!(negated, Clause::or_field("color", vec!["red".into()], false));
    }

    #[test]
    fn test_parse_is_clauses() {
        let ast = parse("is:open -is:archived");
        assert!(ast.get_is_clause("open").unwrap().is_must());
        assert!(!ast.get_is_clause("archived").unwrap().is_must());

        // The last clause for a flag wins
        let replaced = parse("is:open -is:open");
        assert_eq!(only(&replaced), Clause::must_not_is("open"));
    }

    #[test]
    fn test_duplicate_clauses_collapse() {
        assert_eq!(parse("a:b a:b").len(), 1);
    }

    #[test]
    fn test_escapes_in_words_and_phrases() {
        assert_eq!(
            only(&parse(r#"title:"say \"hi\"""#)),
            Clause::field("title", Operator::Eq, "say \"hi\"", true)
        );
        assert_eq!(only(&parse(r"a\(b")), Clause::term("a(b", true));
        assert_eq!(only(&parse("\"\"")), Clause::term("", true));
    }

    #[test]
    fn test_custom_phrase_delimiter() {
        let options = ParseOptions::new().phrase_delimiter('\'');
        let ast = parse_query("name:'John Smith'", &options).unwrap();
        assert_eq!(
            only(&ast),
            Clause::field("name", Operator::Eq, "John Smith", true)
        );
    }

    #[test]
    fn test_schema_types_values() {
        let schema = Schema::new()
            .field("zip", FieldType::String)
            .field("created", FieldType::Date)
            .field("count", FieldType::Number);
        let options = ParseOptions::new().schema(schema);

        let ast = parse_query("zip:01234 created>\"last week\" count:7", &options).unwrap();
        assert!(ast.has_simple_field_clause("zip", Some(&"01234".into())));
        match ast.get_simple_field_clause("created", None) {
            Some(Clause::Field {
                value: Value::Date(date),
                operator: Operator::Gt,
                ..
            }) => assert_eq!(date.granularity(), Some(crate::date::Granularity::Week)),
            other => panic!("unexpected clause: {:?}", other),
        }

        let err = parse_query("count:many created:someday", &options).unwrap_err();
        let rules: Vec<&str> = err.messages().iter().map(|m| m.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["invalid-value", "invalid-date"]);
    }

    #[test]
    fn test_strict_schema_rejects_unknown_fields() {
        let options = ParseOptions::new().schema(Schema::new().strict(true).field("a", FieldType::String));
        let err = parse_query("a:x b:y", &options).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.messages()[0].rule_id, "unknown-field");
        assert_eq!(err.messages()[0].column, 5);
    }

    #[test]
    fn test_disallowed_operator() {
        let options = ParseOptions::new().operators(&[Operator::Eq]);
        let err = parse_query("age>5", &options).unwrap_err();
        assert_eq!(err.messages()[0].rule_id, "operator-not-allowed");
    }

    #[test]
    fn test_reports_multiple_errors_and_recovers() {
        let (ast, messages) = parse_partial("ok status: color:(red blue) fine", &ParseOptions::default());
        let rules: Vec<&str> = messages.iter().map(|m| m.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["missing-value", "malformed-group"]);
        assert_eq!(ast.len(), 2);
        assert_eq!(messages[0].location.start.offset, 3);
        assert_eq!(messages[0].location.end.offset, 10);
    }

    #[test]
    fn test_unterminated_phrase() {
        let err = parse_query("title:\"open ended", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.messages()[0].rule_id, "unterminated-phrase");
        assert_eq!(err.messages()[0].location.end.offset, 17);
    }

    #[test]
    fn test_unclosed_group() {
        let err = parse_query("color:(red or blue", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.messages()[0].rule_id, "unclosed-group");
    }

    #[test]
    fn test_unexpected_input() {
        let err = parse_query("a:b) c", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.messages()[0].rule_id, "unexpected-input");
        assert_eq!(err.messages()[0].message, "unexpected input 'a:b)'");

        let lone = parse_query("- x", &ParseOptions::default()).unwrap_err();
        assert_eq!(lone.messages()[0].message, "unexpected input '-'");
    }

    #[test]
    fn test_is_field_with_group_is_rejected() {
        let err = parse_query("is:(a or b)", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.messages()[0].rule_id, "invalid-flag");
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value("12"), Value::Number(12.0));
        assert_eq!(infer_value("-0.5"), Value::Number(-0.5));
        assert_eq!(infer_value("1e5"), Value::String("1e5".into()));
        assert_eq!(infer_value("True"), Value::String("True".into()));
        assert_eq!(infer_value("false"), Value::Bool(false));
    }
}
