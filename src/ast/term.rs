use std::{cmp::Ordering, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;

static NUMBER_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").expect("number pattern is valid")
});

/// A single term of the residual tree.
///
/// Terms are the leaves and the composite values of a residual expression.
/// They mirror the value kinds of the policy language.
///
/// Equality agrees with the total order: sets compare without regard to
/// element order, and numbers compare by value and then by spelling.
#[derive(Debug, Clone)]
pub enum Term {
    /// `null`
    Null,

    /// `true` / `false`
    Boolean(bool),

    /// Number literal
    ///
    /// Kept as the exact decimal text produced by the policy engine. The
    /// policy language makes no distinction between integers and floats, so
    /// neither do we.
    Number(String),

    /// String literal
    String(String),

    /// Variable
    ///
    /// As the head of a reference this names the root document (`input`).
    /// Inside a reference it marks a position the policy iterated over
    /// (`[_]`, `[x]`).
    Var(String),

    /// Reference: a variable head followed by field, index or variable segments
    ///
    /// # Example
    /// ```text
    /// input.post.moderators[_]
    /// ```
    Ref(Vec<Term>),

    /// Ordered array of terms
    Array(Vec<Term>),

    /// Unordered set of terms
    ///
    /// Elements keep the order they were read in; `{1, 2} == {2, 1}`.
    Set(Vec<Term>),

    /// Object of key/value term pairs
    Object(Vec<(Term, Term)>),

    /// Function call; the first term is the operator reference
    ///
    /// # Example
    /// ```text
    /// internal.member_2(input.post.can, ["edit", "*"])
    /// ```
    Call(Vec<Term>),
}

impl Term {
    pub fn var(name: &str) -> Self {
        Term::Var(name.to_string())
    }

    pub fn string(s: &str) -> Self {
        Term::String(s.to_string())
    }

    pub fn number(text: &str) -> Self {
        Term::Number(text.to_string())
    }

    /// Build a reference from a dotted path, e.g. `input.post.author`.
    ///
    /// The first segment becomes the variable head, `_` segments become
    /// wildcard variables and everything else a string segment.
    pub fn dotted_ref(path: &str) -> Self {
        let mut segments = path.split('.');
        let mut terms = Vec::new();
        if let Some(head) = segments.next() {
            terms.push(Term::var(head));
        }
        for segment in segments {
            if segment == "_" {
                terms.push(Term::var(segment));
            } else {
                terms.push(Term::string(segment));
            }
        }
        Term::Ref(terms)
    }

    /// Human-readable kind name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Null => "null",
            Term::Boolean(_) => "boolean",
            Term::Number(_) => "number",
            Term::String(_) => "string",
            Term::Var(_) => "var",
            Term::Ref(_) => "ref",
            Term::Array(_) => "array",
            Term::Set(_) => "set",
            Term::Object(_) => "object",
            Term::Call(_) => "call",
        }
    }

    /// Rank of the kind in the total order over terms.
    fn rank(&self) -> u8 {
        match self {
            Term::Null => 0,
            Term::Boolean(_) => 1,
            Term::Number(_) => 2,
            Term::String(_) => 3,
            Term::Var(_) => 4,
            Term::Ref(_) => 5,
            Term::Array(_) => 6,
            Term::Object(_) => 7,
            Term::Set(_) => 8,
            Term::Call(_) => 9,
        }
    }

    /// Elements of a set in their canonical order.
    pub fn sorted(elements: &[Term]) -> Vec<Term> {
        let mut sorted = elements.to_vec();
        sorted.sort();
        sorted
    }
}

/// Returns true if `text` is a well-formed number literal.
pub fn is_valid_number(text: &str) -> bool {
    NUMBER_SYNTAX.is_match(text)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

/// Magnitude of a number of any size; values past `f64` range saturate to
/// infinity.
fn parse_magnitude(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|x| !x.is_nan())
}

fn compare_magnitudes(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Orders numbers by value. `Decimal` splits values that `f64` rounds
/// together; equal values with different spellings ("1.0" and "1") order by
/// their text.
fn compare_numbers(a: &str, b: &str) -> Ordering {
    compare_magnitudes(parse_magnitude(a), parse_magnitude(b))
        .then_with(|| parse_decimal(a).cmp(&parse_decimal(b)))
        .then_with(|| a.cmp(b))
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Term::Null, Term::Null) => Ordering::Equal,
            (Term::Boolean(a), Term::Boolean(b)) => a.cmp(b),
            (Term::Number(a), Term::Number(b)) => compare_numbers(a, b),
            (Term::String(a), Term::String(b)) => a.cmp(b),
            (Term::Var(a), Term::Var(b)) => a.cmp(b),
            (Term::Ref(a), Term::Ref(b))
            | (Term::Array(a), Term::Array(b))
            | (Term::Call(a), Term::Call(b)) => a.cmp(b),
            (Term::Set(a), Term::Set(b)) => Term::sorted(a).cmp(&Term::sorted(b)),
            (Term::Object(a), Term::Object(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Term {}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    starts_ok
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !matches!(s, "true" | "false" | "null" | "not")
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

fn write_list(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", term)?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Null => f.write_str("null"),
            Term::Boolean(b) => write!(f, "{}", b),
            Term::Number(n) => f.write_str(n),
            Term::String(s) => write_quoted(f, s),
            Term::Var(name) => f.write_str(name),
            Term::Ref(terms) => {
                let Some((head, rest)) = terms.split_first() else {
                    return Ok(());
                };
                write!(f, "{}", head)?;
                for segment in rest {
                    match segment {
                        Term::String(s) if is_identifier(s) => write!(f, ".{}", s)?,
                        other => write!(f, "[{}]", other)?,
                    }
                }
                Ok(())
            }
            Term::Array(terms) => {
                f.write_str("[")?;
                write_list(f, terms)?;
                f.write_str("]")
            }
            Term::Set(terms) if terms.is_empty() => f.write_str("set()"),
            Term::Set(terms) => {
                f.write_str("{")?;
                write_list(f, terms)?;
                f.write_str("}")
            }
            Term::Object(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Term::Call(terms) => {
                let Some((op, args)) = terms.split_first() else {
                    return Ok(());
                };
                write!(f, "{}(", op)?;
                write_list(f, args)?;
                f.write_str(")")
            }
        }
    }
}
