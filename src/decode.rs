//! Decoding of the policy engine's JSON residual encoding.
//!
//! ```json
//! {"queries": [[
//!   {"terms": [
//!     {"type": "ref", "value": [{"type": "var", "value": "eq"}]},
//!     {"type": "ref", "value": [{"type": "var", "value": "input"},
//!                               {"type": "string", "value": "post"},
//!                               {"type": "string", "value": "author"}]},
//!     {"type": "string", "value": "bob"}
//!   ]}
//! ]]}
//! ```
//!
//! The document may also be wrapped as `{"result": {"queries": ...}}` or be
//! the bare list of queries. An expression whose `terms` is an array is a
//! call; an object is a single term.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::ast::{Expr, ExprTerms, PartialQueries, Query, Term};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected}, found {found}")]
    Shape { expected: &'static str, found: String },

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("unknown term type {0}")]
    UnknownType(String),
}

fn shape(expected: &'static str, found: &Value) -> DecodeError {
    let found = match found {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    };
    DecodeError::Shape { expected, found }
}

fn into_array(value: Value, expected: &'static str) -> Result<Vec<Value>, DecodeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(shape(expected, &other)),
    }
}

fn into_object(value: Value, expected: &'static str) -> Result<Map<String, Value>, DecodeError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(shape(expected, &other)),
    }
}

/// Parse a residual query set from its JSON encoding.
pub fn partial_queries_from_json(json: &str) -> Result<PartialQueries, DecodeError> {
    let value: Value = serde_json::from_str(json)?;
    partial_queries_from_value(value)
}

pub fn partial_queries_from_value(value: Value) -> Result<PartialQueries, DecodeError> {
    let queries = match value {
        Value::Object(mut map) => {
            if let Some(result) = map.remove("result") {
                return partial_queries_from_value(result);
            }
            match map.remove("queries") {
                // Engines omit the field when nothing can be allowed
                None | Some(Value::Null) => Vec::new(),
                Some(queries) => into_array(queries, "array of queries")?,
            }
        }
        other => into_array(other, "array of queries")?,
    };

    let queries = queries
        .into_iter()
        .map(query_from_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PartialQueries::new(queries))
}

fn query_from_value(value: Value) -> Result<Query, DecodeError> {
    let exprs = into_array(value, "query (array of expressions)")?
        .into_iter()
        .map(expr_from_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Query::new(exprs))
}

fn expr_from_value(value: Value) -> Result<Expr, DecodeError> {
    let mut map = into_object(value, "expression object")?;

    let negated = match map.remove("negated") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(other) => return Err(shape("boolean negated flag", &other)),
    };

    let terms = match map.remove("terms").ok_or(DecodeError::MissingField("terms"))? {
        Value::Array(items) => ExprTerms::Call(terms_from_values(items)?),
        term @ Value::Object(_) => ExprTerms::Term(term_from_value(term)?),
        other => return Err(shape("expression terms", &other)),
    };

    Ok(Expr { terms, negated })
}

fn terms_from_values(values: Vec<Value>) -> Result<Vec<Term>, DecodeError> {
    values.into_iter().map(term_from_value).collect()
}

/// Decode one `{"type": ..., "value": ...}` term.
pub fn term_from_value(value: Value) -> Result<Term, DecodeError> {
    let mut map = into_object(value, "term object")?;

    let kind = match map.remove("type").ok_or(DecodeError::MissingField("type"))? {
        Value::String(kind) => kind,
        other => return Err(shape("term type string", &other)),
    };
    let value = map.remove("value").unwrap_or(Value::Null);

    let term = match (kind.as_str(), value) {
        ("null", _) => Term::Null,
        ("boolean", Value::Bool(b)) => Term::Boolean(b),
        ("number", Value::Number(n)) => Term::Number(n.to_string()),
        ("string", Value::String(s)) => Term::String(s),
        ("var", Value::String(s)) => Term::Var(s),
        ("ref", Value::Array(items)) => Term::Ref(terms_from_values(items)?),
        ("array", Value::Array(items)) => Term::Array(terms_from_values(items)?),
        ("set", Value::Array(items)) => Term::Set(terms_from_values(items)?),
        ("call", Value::Array(items)) => Term::Call(terms_from_values(items)?),
        ("object", Value::Array(items)) => {
            let mut pairs = Vec::with_capacity(items.len());
            for item in items {
                let pair = into_array(item, "object entry [key, value]")?;
                let [key, value]: [Value; 2] = pair
                    .try_into()
                    .map_err(|pair: Vec<Value>| shape("object entry [key, value]", &Value::Array(pair)))?;
                pairs.push((term_from_value(key)?, term_from_value(value)?));
            }
            Term::Object(pairs)
        }
        (
            "boolean" | "number" | "string" | "var" | "ref" | "array" | "set" | "call" | "object",
            other,
        ) => return Err(shape("term value matching its type", &other)),
        (unknown, _) => return Err(DecodeError::UnknownType(unknown.to_string())),
    };
    Ok(term)
}
