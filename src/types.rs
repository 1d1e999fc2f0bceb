use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Declared type of an input variable.
///
/// Declarations tell the compiler what a column holds, which decides how
/// comparisons and membership tests against it are rendered.
///
/// # Serialization
///
/// ```text
/// "boolean" | "string" | "number" | {"array": T} | {"map": T}
/// ```
///
/// # Examples
///
/// ```
/// use regosql::types::VarType;
///
/// let tags = VarType::array(VarType::String);
/// assert!(tags.is_array());
/// assert_eq!(tags.to_string(), "array<string>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Boolean,
    String,
    Number,

    /// Array of values of one type
    Array(Box<VarType>),

    /// Map from string keys to values of one type
    Map(Box<VarType>),
}

impl VarType {
    pub fn array(element: VarType) -> Self {
        VarType::Array(Box::new(element))
    }

    pub fn map(value: VarType) -> Self {
        VarType::Map(Box::new(value))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, VarType::Array(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, VarType::Boolean | VarType::String | VarType::Number)
    }

    /// Type of the values held by an array or map.
    pub fn element(&self) -> Option<&VarType> {
        match self {
            VarType::Array(t) | VarType::Map(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Boolean => f.write_str("boolean"),
            VarType::String => f.write_str("string"),
            VarType::Number => f.write_str("number"),
            VarType::Array(t) => write!(f, "array<{}>", t),
            VarType::Map(t) => write!(f, "map<string, {}>", t),
        }
    }
}

/// Strategy turning a variable path into the SQL text of its column.
#[derive(Debug, Clone)]
pub enum ColumnNamer {
    /// Fixed column name or expression
    ///
    /// # Example
    /// ```text
    /// input.post.author → author
    /// ```
    Static(String),

    /// Regex substitution over the dotted variable path
    ///
    /// # Example
    /// ```text
    /// regex:   input\.post\.authors\.(.*)
    /// replace: authors->'$1'
    ///
    /// input.post.authors.name → authors->'name'
    /// ```
    Pattern { regex: Regex, replacement: String },
}

impl ColumnNamer {
    pub fn fixed(name: &str) -> Self {
        ColumnNamer::Static(name.to_string())
    }

    /// Regex substitution namer; fails if the pattern does not compile.
    pub fn pattern(regex: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(ColumnNamer::Pattern {
            regex: Regex::new(regex)?,
            replacement: replacement.to_string(),
        })
    }

    pub fn is_static(&self) -> bool {
        matches!(self, ColumnNamer::Static(_))
    }

    /// Column text for `dotted`, or `None` when a pattern does not match.
    pub fn name(&self, dotted: &str) -> Option<String> {
        match self {
            ColumnNamer::Static(name) => Some(name.clone()),
            ColumnNamer::Pattern { regex, replacement } => {
                if !regex.is_match(dotted) {
                    return None;
                }
                Some(regex.replace(dotted, replacement.as_str()).into_owned())
            }
        }
    }
}
