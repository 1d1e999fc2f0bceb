//! Compiles a residual query set into a single SQL predicate.
//!
//! The compiler is a pure function of a [`CompileConfig`] and the residual
//! tree. It fails fast on structural problems (unsupported operators, wrong
//! arity, unresolved variables) and then renders the resulting [`Node`]
//! tree, turning any rendering error into a compilation failure so that a
//! placeholder never reaches a query.
//!
//! # Examples
//!
//! ```
//! use regosql::ast::{Expr, PartialQueries, Query, Term};
//! use regosql::compiler::{CompileConfig, compile_sql};
//! use regosql::tree::VariableTree;
//! use regosql::types::{ColumnNamer, VarType};
//! use regosql::variables::{TreeMatcher, VariableConverter};
//!
//! let tree = VariableTree::new()
//!     .declare("input.post.author", VarType::String, ColumnNamer::fixed("author"))
//!     .unwrap();
//! let config = CompileConfig::new(VariableConverter::new().with_matcher(TreeMatcher::new(tree)));
//!
//! let partial = PartialQueries::new(vec![Query::new(vec![Expr::call(
//!     "eq",
//!     vec![Term::dotted_ref("input.post.author"), Term::string("bob")],
//! )])]);
//!
//! assert_eq!(compile_sql(&config, &partial).unwrap(), "author = 'bob'");
//! ```

use thiserror::Error;

use crate::{
    ast::{Expr, ExprTerms, PartialQueries, Query, Term, query::operator_name, term::is_valid_number},
    path::{PathError, extract_path},
    sql::{GenerateError, Node, SqlGenerator},
    variables::VariableConverter,
};

/// Compilation settings. Immutable once built; safe to share between
/// concurrent compilations.
#[derive(Debug, Clone, Default)]
pub struct CompileConfig {
    /// Resolves variable references to column nodes
    pub variable_converter: Option<VariableConverter>,
}

impl CompileConfig {
    pub fn new(variable_converter: VariableConverter) -> Self {
        CompileConfig {
            variable_converter: Some(variable_converter),
        }
    }
}

/// Errors that can occur while compiling a residual query set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("query {query}")]
    Query {
        query: String,
        #[source]
        source: Box<CompileError>,
    },

    #[error("expression {expr}")]
    Expression {
        expr: String,
        #[source]
        source: Box<CompileError>,
    },

    #[error("term {term}")]
    Term {
        term: String,
        #[source]
        source: Box<CompileError>,
    },

    #[error("operator {0} not supported")]
    UnsupportedOperator(String),

    #[error("expected {expected} terms, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("{0} is not a boolean expression")]
    NotBoolean(String),

    #[error("variable {0} cannot be converted")]
    Unresolved(String),

    #[error("no variable converter provided to handle variables")]
    NoConverter,

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("var {0} not supported outside of a reference")]
    UnboundVar(String),

    #[error("{0} not supported")]
    Unsupported(&'static str),

    #[error("invalid number {0}")]
    InvalidNumber(String),

    #[error("sql generation failed: {}", join_errors(.0))]
    Generation(Vec<GenerateError>),
}

fn join_errors(errors: &[GenerateError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CompileError {
    fn in_query(query: &Query, source: CompileError) -> Self {
        CompileError::Query {
            query: query.to_string(),
            source: Box::new(source),
        }
    }

    fn in_expression(expr: &Expr, source: CompileError) -> Self {
        CompileError::Expression {
            expr: expr.to_string(),
            source: Box::new(source),
        }
    }

    fn in_term(term: &Term, source: CompileError) -> Self {
        CompileError::Term {
            term: term.to_string(),
            source: Box::new(source),
        }
    }

    /// The innermost cause of the error chain.
    pub fn root_cause(&self) -> &CompileError {
        match self {
            CompileError::Query { source, .. }
            | CompileError::Expression { source, .. }
            | CompileError::Term { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Compile a residual query set into SQL text for a `WHERE` clause.
pub fn compile_sql(config: &CompileConfig, partial: &PartialQueries) -> Result<String, CompileError> {
    let node = convert_partial(config, partial)?;

    let mut generator = SqlGenerator::new();
    let sql = node.render(&mut generator);

    if generator.has_errors() {
        log::warn!(
            "{} error(s) rendering residual queries:\n{}",
            generator.errors().len(),
            partial
        );
        return Err(CompileError::Generation(generator.into_errors()));
    }

    log::debug!("compiled sql: {}", sql);
    Ok(sql)
}

/// Convert a residual query set into one boolean node.
///
/// No queries compile to `false`; any empty query compiles to `true`.
pub fn convert_partial(config: &CompileConfig, partial: &PartialQueries) -> Result<Node, CompileError> {
    log::debug!("compiling {} residual queries", partial.queries.len());

    if partial.queries.is_empty() {
        // Always deny
        return Ok(Node::bool(false));
    }

    if partial.queries.iter().any(Query::is_empty) {
        // Always allow
        return Ok(Node::bool(true));
    }

    let mut queries = Vec::with_capacity(partial.queries.len());
    for query in &partial.queries {
        let converted = convert_query(config, query).map_err(|e| CompileError::in_query(query, e))?;

        if !converted.is_boolean() {
            return Err(CompileError::in_query(
                query,
                CompileError::NotBoolean(query.to_string()),
            ));
        }
        queries.push(converted);
    }

    Ok(Node::or(partial.to_string(), queries))
}

fn convert_query(config: &CompileConfig, query: &Query) -> Result<Node, CompileError> {
    let mut exprs = Vec::with_capacity(query.exprs.len());
    for expr in &query.exprs {
        let node = convert_expression(config, expr).map_err(|e| CompileError::in_expression(expr, e))?;
        exprs.push(node);
    }

    Ok(Node::and(query.to_string(), exprs))
}

fn convert_expression(config: &CompileConfig, expr: &Expr) -> Result<Node, CompileError> {
    if expr.negated {
        return Err(CompileError::Unsupported("negated expression"));
    }

    let node = match &expr.terms {
        ExprTerms::Call(terms) => convert_call(config, terms)?,
        ExprTerms::Term(term) => convert_term(config, term)?,
    };

    if !node.is_boolean() {
        return Err(CompileError::NotBoolean(expr.to_string()));
    }
    Ok(node)
}

/// Convert a call: the operator reference followed by its arguments.
fn convert_call(config: &CompileConfig, call: &[Term]) -> Result<Node, CompileError> {
    let (op, args) = call
        .split_first()
        .ok_or(CompileError::Unsupported("empty call"))?;

    let name = operator_name(op).ok_or_else(|| CompileError::UnsupportedOperator(op.to_string()))?;

    match name.as_str() {
        "eq" | "equal" | "equals" | "neq" | "notequal" | "notequals" => {
            let negate = matches!(name.as_str(), "neq" | "notequal" | "notequals");
            let [left, right] = convert_terms::<2>(config, args)?;
            Ok(Node::equality(negate, left, right))
        }
        "internal.member_2" => {
            let [element, collection] = convert_terms::<2>(config, args)?;
            Ok(Node::member_of(element, collection))
        }
        _ => Err(CompileError::UnsupportedOperator(name)),
    }
}

fn convert_terms<const N: usize>(config: &CompileConfig, terms: &[Term]) -> Result<[Node; N], CompileError> {
    let terms: &[Term; N] = terms.try_into().map_err(|_| CompileError::Arity {
        expected: N,
        got: terms.len(),
    })?;

    let mut nodes = Vec::with_capacity(N);
    for term in terms {
        nodes.push(convert_term(config, term).map_err(|e| CompileError::in_term(term, e))?);
    }

    nodes.try_into().map_err(|nodes: Vec<Node>| CompileError::Arity {
        expected: N,
        got: nodes.len(),
    })
}

fn convert_term(config: &CompileConfig, term: &Term) -> Result<Node, CompileError> {
    match term {
        Term::Var(name) => Err(CompileError::UnboundVar(name.clone())),
        Term::Ref(terms) => {
            let path = extract_path(terms)?;

            let converter = config
                .variable_converter
                .as_ref()
                .ok_or(CompileError::NoConverter)?;

            converter
                .convert(&path)
                .ok_or_else(|| CompileError::Unresolved(term.to_string()))
        }
        Term::String(s) => Ok(Node::string(s)),
        Term::Number(n) => {
            if !is_valid_number(n) {
                return Err(CompileError::InvalidNumber(n.clone()));
            }
            Ok(Node::number(n))
        }
        Term::Boolean(b) => Ok(Node::bool(*b)),
        Term::Array(elements) => {
            let mut nodes = Vec::with_capacity(elements.len());
            for element in elements {
                nodes.push(convert_term(config, element).map_err(|e| CompileError::in_term(element, e))?);
            }
            Ok(Node::array(term.to_string(), nodes))
        }
        // Sets compile like arrays once put in canonical order
        Term::Set(elements) => convert_term(config, &Term::Array(Term::sorted(elements))),
        Term::Call(terms) => convert_call(config, terms),
        Term::Object(_) => Err(CompileError::Unsupported("object")),
        Term::Null => Err(CompileError::Unsupported("null")),
    }
}
