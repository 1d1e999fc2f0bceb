//! Path-indexed registry of declared input variables.
//!
//! The tree maps dotted variable paths (`input.post.author`) to a declared
//! [`VarType`] and a [`ColumnNamer`]. Each node has exact-key children plus at
//! most one wildcard child, so `input.posts.*.author` matches any key in the
//! starred position.
//!
//! # Lookup policy
//!
//! Lookup walks the query path segment by segment. A literal segment follows
//! the exact child with that key, falling back to the wildcard child; a
//! wildcard segment (an iterated position such as `[_]`) only follows the
//! wildcard child. The deepest declaration seen along the walk wins, and the
//! segments past it are returned to the caller for projection.
//!
//! Declarations that would make a literal segment match two children are
//! rejected when the tree is built.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    path::{Path, PathSegment, parse_dotted, to_dotted},
    types::{ColumnNamer, VarType},
};

/// Configuration errors raised while declaring variables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("cannot declare an empty path")]
    EmptyPath,

    #[error("{path} is declared more than once")]
    Duplicate { path: String },

    #[error("{path} overlaps a sibling declaration: a node cannot have both named and wildcard children")]
    AmbiguousWildcard { path: String },
}

/// A declared variable: its type and how its column is named.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub ty: VarType,
    pub namer: ColumnNamer,
}

/// Result of a successful lookup.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'t, 'p> {
    /// Deepest declaration along the path
    pub declaration: &'t Declaration,
    /// Path segments covered by the declaration
    pub matched: &'p [PathSegment],
    /// Segments past the declaration
    pub rest: &'p [PathSegment],
}

#[derive(Debug, Clone, Default)]
struct TreeNode {
    declaration: Option<Declaration>,
    children: BTreeMap<String, TreeNode>,
    wildcard: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn child_mut(&mut self, segment: &PathSegment, path: &str) -> Result<&mut TreeNode, TreeError> {
        let ambiguous = || TreeError::AmbiguousWildcard {
            path: path.to_string(),
        };
        match segment.key() {
            Some(key) => {
                if self.wildcard.is_some() {
                    return Err(ambiguous());
                }
                Ok(self.children.entry(key).or_default())
            }
            None => {
                if !self.children.is_empty() {
                    return Err(ambiguous());
                }
                Ok(&mut **self.wildcard.get_or_insert_with(Box::default))
            }
        }
    }

    fn child(&self, segment: &PathSegment) -> Option<&TreeNode> {
        let exact = segment.key().and_then(|key| self.children.get(&key));
        exact.or(self.wildcard.as_deref())
    }
}

/// Trie of declared variables, built once and read-only afterwards.
///
/// # Examples
///
/// ```
/// use regosql::path::parse_dotted;
/// use regosql::tree::VariableTree;
/// use regosql::types::{ColumnNamer, VarType};
///
/// let tree = VariableTree::new()
///     .declare("input.post.author", VarType::String, ColumnNamer::fixed("author"))
///     .unwrap();
///
/// let path = parse_dotted("input.post.author");
/// let found = tree.lookup(&path).unwrap();
/// assert_eq!(found.declaration.ty, VarType::String);
/// assert!(found.rest.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct VariableTree {
    root: TreeNode,
    len: usize,
}

impl VariableTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a dotted path (`*` for wildcard positions), builder style.
    pub fn declare(mut self, path: &str, ty: VarType, namer: ColumnNamer) -> Result<Self, TreeError> {
        self.insert(&parse_dotted(path), ty, namer)?;
        Ok(self)
    }

    /// Declare a path given as segments.
    pub fn insert(&mut self, path: &[PathSegment], ty: VarType, namer: ColumnNamer) -> Result<(), TreeError> {
        if path.is_empty() {
            return Err(TreeError::EmptyPath);
        }
        let dotted = to_dotted(path);

        let mut node = &mut self.root;
        for segment in path {
            node = node.child_mut(segment, &dotted)?;
        }

        if node.declaration.is_some() {
            return Err(TreeError::Duplicate { path: dotted });
        }
        node.declaration = Some(Declaration { ty, namer });
        self.len += 1;
        Ok(())
    }

    /// Find the deepest declaration covering a prefix of `path`.
    pub fn lookup<'t, 'p>(&'t self, path: &'p [PathSegment]) -> Option<Lookup<'t, 'p>> {
        let mut node = &self.root;
        let mut found = None;

        for (depth, segment) in path.iter().enumerate() {
            let Some(next) = node.child(segment) else {
                break;
            };
            node = next;
            if let Some(declaration) = &node.declaration {
                found = Some((declaration, depth + 1));
            }
        }

        found.map(|(declaration, depth)| {
            let (matched, rest) = path.split_at(depth);
            Lookup {
                declaration,
                matched,
                rest,
            }
        })
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All declared paths in dotted form: named children by key, then the
    /// wildcard child.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths(&self.root, &mut Path::new(), &mut out);
        out
    }
}

fn collect_paths(node: &TreeNode, prefix: &mut Path, out: &mut Vec<String>) {
    if node.declaration.is_some() {
        out.push(to_dotted(prefix));
    }
    for (key, child) in &node.children {
        prefix.push(PathSegment::Field(key.clone()));
        collect_paths(child, prefix, out);
        prefix.pop();
    }
    if let Some(child) = &node.wildcard {
        prefix.push(PathSegment::Wildcard("*".to_string()));
        collect_paths(child, prefix, out);
        prefix.pop();
    }
}
