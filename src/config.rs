//! JSON configuration for the compiler.
//!
//! ```json
//! {
//!   "presets": true,
//!   "columns": [
//!     { "path": "input.post.author", "type": "string", "column": "author" },
//!     { "path": "input.post.moderators", "type": { "array": "string" }, "column": "moderators" },
//!     { "path": "input.post.authors", "type": { "map": "string" },
//!       "pattern": { "regex": "^input\\.post\\.authors\\.(.+)$", "replace": "authors->'$1'" } }
//!   ],
//!   "exact": [
//!     { "path": "input.object.team", "type": "string", "column": "team_id :: text" }
//!   ],
//!   "acl_groups": [
//!     { "prefix": "input.object.acl_role_list", "column": "role_acl" }
//!   ],
//!   "disable": ["acl"]
//! }
//! ```
//!
//! Exact columns and ACL prefixes join the `core` and `acl` groups of the
//! built-in presets; tree declarations form the `columns` group. Groups named
//! in `disable` are left out of the converter.

use serde::Deserialize;
use thiserror::Error;

use crate::{
    compiler::CompileConfig,
    presets::{self, ACL, CORE},
    tree::{TreeError, VariableTree},
    types::{ColumnNamer, VarType},
    variables::{AclGroupMatcher, ColumnMatcher, MatcherSet, TreeMatcher},
};

/// Matcher group holding the tree declarations.
pub const COLUMNS: &str = "columns";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("invalid pattern for {path}: {source}")]
    Regex {
        path: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0}: exactly one of column or pattern is required")]
    Namer(String),
}

/// Regex substitution applied to a dotted variable path.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    pub regex: String,
    pub replace: String,
}

/// A typed declaration in the variable tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    pub path: String,
    #[serde(rename = "type")]
    pub ty: VarType,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub pattern: Option<PatternConfig>,
}

impl ColumnConfig {
    fn namer(&self) -> Result<ColumnNamer, ConfigError> {
        match (&self.column, &self.pattern) {
            (Some(column), None) => Ok(ColumnNamer::fixed(column)),
            (None, Some(pattern)) => {
                ColumnNamer::pattern(&pattern.regex, &pattern.replace).map_err(|source| ConfigError::Regex {
                    path: self.path.clone(),
                    source,
                })
            }
            _ => Err(ConfigError::Namer(self.path.clone())),
        }
    }
}

/// One exact variable path bound to a column expression.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExactConfig {
    pub path: String,
    pub column: String,
    #[serde(rename = "type")]
    pub ty: VarType,
}

/// A JSON object column of ACL lists keyed by group.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AclGroupConfig {
    pub prefix: String,
    pub column: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Start from the built-in ownership and ACL matchers
    pub presets: bool,
    pub columns: Vec<ColumnConfig>,
    pub exact: Vec<ExactConfig>,
    pub acl_groups: Vec<AclGroupConfig>,
    /// Matcher groups to leave out
    pub disable: Vec<String>,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Declarations of `columns` as a variable tree.
    pub fn variable_tree(&self) -> Result<VariableTree, ConfigError> {
        let mut tree = VariableTree::new();
        for column in &self.columns {
            tree = tree.declare(&column.path, column.ty.clone(), column.namer()?)?;
        }
        Ok(tree)
    }

    /// All configured matchers, in resolution order: exact columns, ACL
    /// lists, then the variable tree.
    pub fn matcher_set(&self) -> Result<MatcherSet, ConfigError> {
        let mut set = if self.presets {
            presets::matcher_set()
        } else {
            MatcherSet::new()
        };

        for exact in &self.exact {
            set = set.with(CORE, ColumnMatcher::new(&exact.path, &exact.column, exact.ty.clone()));
        }
        for acl in &self.acl_groups {
            set = set.with(ACL, AclGroupMatcher::new(&acl.prefix, &acl.column));
        }

        let tree = self.variable_tree()?;
        if !tree.is_empty() {
            set = set.with(COLUMNS, TreeMatcher::new(tree));
        }
        Ok(set)
    }

    pub fn compile_config(&self) -> Result<CompileConfig, ConfigError> {
        let disabled: Vec<&str> = self.disable.iter().map(String::as_str).collect();
        let converter = self.matcher_set()?.converter_without(&disabled);

        log::debug!("variable converter: {}", converter.matcher_names().join(", "));
        Ok(CompileConfig::new(converter))
    }
}
