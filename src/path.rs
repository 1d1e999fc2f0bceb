use std::fmt;

use thiserror::Error;

use crate::ast::{Term, term::is_valid_number};

/// A segment in a variable path.
///
/// Paths are extracted from reference terms and used to look up column
/// declarations in the variable tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object field access by name
    ///
    /// # Examples
    /// - `input.post` → `[Field("input"), Field("post")]`
    /// - `input.post.authors["name"]` → `..., Field("authors"), Field("name")`
    Field(String),

    /// Array element access by index
    ///
    /// # Examples
    /// - `input.post.list[0]` → `..., Field("list"), Index(0)`
    Index(i64),

    /// A position the policy iterated over
    ///
    /// # Examples
    /// - `input.post.moderators[_]` → `..., Field("moderators"), Wildcard("_")`
    /// - `input.posts[x].author` → `..., Field("posts"), Wildcard("x"), Field("author")`
    Wildcard(String),
}

impl PathSegment {
    /// Key used to match an exact declaration, `None` for wildcards.
    pub fn key(&self) -> Option<String> {
        match self {
            PathSegment::Field(name) => Some(name.clone()),
            PathSegment::Index(i) => Some(i.to_string()),
            PathSegment::Wildcard(_) => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, PathSegment::Wildcard(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Wildcard(_) => f.write_str("*"),
        }
    }
}

/// A sequence of path segments identifying an input variable.
pub type Path = Vec<PathSegment>;

/// Errors for references that do not form a variable path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty ref not supported")]
    Empty,

    #[error("ref must start with a variable, found {0}")]
    InvalidHead(String),

    #[error("unsupported ref segment {segment} ({kind})")]
    InvalidSegment { segment: String, kind: &'static str },
}

/// Dotted form of a path, e.g. `input.post.moderators.*`.
pub fn to_dotted(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| segment.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Parse a dotted declaration path; `*` marks a wildcard position.
///
/// # Examples
/// ```
/// use regosql::path::{parse_dotted, PathSegment};
///
/// let path = parse_dotted("input.post.*");
/// assert_eq!(path[1], PathSegment::Field("post".into()));
/// assert!(path[2].is_wildcard());
/// ```
pub fn parse_dotted(path: &str) -> Path {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment {
            "*" => PathSegment::Wildcard(segment.to_string()),
            name => PathSegment::Field(name.to_string()),
        })
        .collect()
}

/// Extract a variable path from the terms of a reference
///
/// The structure of a reference is:
/// 1. A variable head naming the root document (`input`)
/// 2. String segments for static field names or quoted keys
/// 3. Integral numbers for array indices
/// 4. Variables for positions the policy iterated over (`[_]`)
///
/// # Examples
/// ```text
/// input.post.author        → [Field("input"), Field("post"), Field("author")]
/// input.post.list[0]       → [..., Field("list"), Index(0)]
/// input.post.moderators[_] → [..., Field("moderators"), Wildcard("_")]
/// ```
pub fn extract_path(terms: &[Term]) -> Result<Path, PathError> {
    let (head, rest) = terms.split_first().ok_or(PathError::Empty)?;

    let mut segments = Vec::with_capacity(terms.len());
    match head {
        Term::Var(name) => segments.push(PathSegment::Field(name.clone())),
        other => return Err(PathError::InvalidHead(other.to_string())),
    }

    for term in rest {
        let segment = match term {
            Term::String(s) => PathSegment::Field(s.clone()),
            Term::Var(name) => PathSegment::Wildcard(name.clone()),
            Term::Number(n) if is_valid_number(n) => match n.parse::<i64>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => {
                    return Err(PathError::InvalidSegment {
                        segment: n.clone(),
                        kind: "non-integral number",
                    });
                }
            },
            other => {
                return Err(PathError::InvalidSegment {
                    segment: other.to_string(),
                    kind: other.kind_name(),
                });
            }
        };
        segments.push(segment);
    }

    Ok(segments)
}
