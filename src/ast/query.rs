use std::fmt;

use crate::ast::Term;

/// The terms of an expression: either a call or a single bare term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprTerms {
    /// Operator reference followed by its arguments
    ///
    /// # Example
    /// ```text
    /// eq(input.post.author, "bob")
    /// ```
    Call(Vec<Term>),

    /// A single term used as a predicate
    ///
    /// # Example
    /// ```text
    /// input.post.deleted
    /// ```
    Term(Term),
}

/// A single residual expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub terms: ExprTerms,

    /// `not` in front of the expression
    pub negated: bool,
}

impl Expr {
    /// Call expression `op(args...)` where `op` is a dotted operator name.
    pub fn call(op: &str, args: Vec<Term>) -> Self {
        let mut terms = Vec::with_capacity(args.len() + 1);
        terms.push(operator_ref(op));
        terms.extend(args);
        Expr {
            terms: ExprTerms::Call(terms),
            negated: false,
        }
    }

    pub fn term(term: Term) -> Self {
        Expr {
            terms: ExprTerms::Term(term),
            negated: false,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self.terms, ExprTerms::Call(_))
    }
}

/// Reference naming an operator, e.g. `internal.member_2`.
pub fn operator_ref(op: &str) -> Term {
    let mut parts = op.split('.');
    let mut terms = Vec::new();
    if let Some(head) = parts.next() {
        terms.push(Term::var(head));
    }
    terms.extend(parts.map(Term::string));
    Term::Ref(terms)
}

/// Dotted name of an operator term, or `None` if the term cannot name one.
pub fn operator_name(op: &Term) -> Option<String> {
    match op {
        Term::Var(name) => Some(name.clone()),
        Term::Ref(terms) => {
            let (head, rest) = terms.split_first()?;
            let Term::Var(head) = head else {
                return None;
            };
            let mut name = head.clone();
            for segment in rest {
                match segment {
                    Term::String(s) => {
                        name.push('.');
                        name.push_str(s);
                    }
                    _ => return None,
                }
            }
            Some(name)
        }
        _ => None,
    }
}

/// A conjunction of expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub exprs: Vec<Expr>,
}

impl Query {
    pub fn new(exprs: Vec<Expr>) -> Self {
        Query { exprs }
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// The full result of partial evaluation: a disjunction of queries.
///
/// An empty set means no assignment of the unknowns satisfies the policy. A
/// set containing an empty query means the policy holds unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialQueries {
    pub queries: Vec<Query>,
}

impl PartialQueries {
    pub fn new(queries: Vec<Query>) -> Self {
        PartialQueries { queries }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("not ")?;
        }
        match &self.terms {
            ExprTerms::Term(term) => write!(f, "{}", term),
            ExprTerms::Call(terms) => {
                let infix = match terms.first().and_then(operator_name).as_deref() {
                    Some("eq") => Some("="),
                    Some("equal") => Some("=="),
                    Some("neq") => Some("!="),
                    _ => None,
                };
                match (infix, terms.as_slice()) {
                    (Some(op), [_, left, right]) => write!(f, "{} {} {}", left, op, right),
                    _ => write!(f, "{}", Term::Call(terms.clone())),
                }
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, expr) in self.exprs.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", expr)?;
        }
        Ok(())
    }
}

impl fmt::Display for PartialQueries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, query) in self.queries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", query)?;
        }
        Ok(())
    }
}
