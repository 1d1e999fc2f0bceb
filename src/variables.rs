//! Variable converter: resolves a variable path into a SQL node.
//!
//! A [`VariableConverter`] is an ordered list of [`VariableMatcher`]s; the
//! first matcher that recognises a path produces the node. Converters are
//! immutable values built from a [`MatcherSet`], where every matcher belongs
//! to a named group and a converter keeps only the groups it includes:
//!
//! ```
//! use regosql::types::VarType;
//! use regosql::variables::{AclGroupMatcher, ColumnMatcher, MatcherSet};
//!
//! let set = MatcherSet::new()
//!     .with("core", ColumnMatcher::new("input.object.owner", "owner_id :: text", VarType::String))
//!     .with("acl", AclGroupMatcher::new("input.object.acl_group_list", "group_acl"));
//!
//! let with_acl = set.converter(&["core", "acl"]);
//! let without_acl = set.converter(&["core"]);
//! assert_eq!(with_acl.len(), 2);
//! assert_eq!(without_acl.len(), 1);
//! ```

use std::{fmt, sync::Arc};

use crate::{
    path::{Path, PathSegment, parse_dotted, to_dotted},
    sql::{Node, node::quote_literal},
    tree::{Lookup, VariableTree},
    types::{ColumnNamer, VarType},
};

/// Recognises variable paths and turns them into SQL nodes.
pub trait VariableMatcher: fmt::Debug + Send + Sync {
    /// Name used in logs.
    fn name(&self) -> String;

    /// The node for `path`, or `None` if this matcher does not handle it.
    fn convert(&self, path: &[PathSegment]) -> Option<Node>;
}

pub type SharedMatcher = Arc<dyn VariableMatcher>;

/// Whole column, or any element of it when the path ends in a wildcard.
fn column_or_element(sql: String, ty: &VarType, rest: &[PathSegment]) -> Option<Node> {
    match rest {
        [] => Some(Node::column(sql, ty.clone())),
        [last] if last.is_wildcard() && ty.is_array() => Some(Node::any_element(sql, ty.clone())),
        _ => None,
    }
}

/// Maps one exact variable path to a column expression.
///
/// # Example
/// ```text
/// input.object.owner → owner_id :: text
/// ```
#[derive(Debug, Clone)]
pub struct ColumnMatcher {
    path: Path,
    column: String,
    ty: VarType,
}

impl ColumnMatcher {
    pub fn new(path: &str, column: &str, ty: VarType) -> Self {
        ColumnMatcher {
            path: parse_dotted(path),
            column: column.to_string(),
            ty,
        }
    }
}

impl VariableMatcher for ColumnMatcher {
    fn name(&self) -> String {
        format!("column {}", to_dotted(&self.path))
    }

    fn convert(&self, path: &[PathSegment]) -> Option<Node> {
        let rest = path.strip_prefix(self.path.as_slice())?;
        column_or_element(self.column.clone(), &self.ty, rest)
    }
}

/// Maps `<prefix>.<group>` to the array of entries stored under `group` in a
/// JSON object column.
///
/// # Example
/// ```text
/// input.object.acl_group_list.admins
///   → ARRAY(SELECT jsonb_array_elements_text(group_acl->'admins'))
/// ```
#[derive(Debug, Clone)]
pub struct AclGroupMatcher {
    prefix: Path,
    column: String,
}

impl AclGroupMatcher {
    pub fn new(prefix: &str, column: &str) -> Self {
        AclGroupMatcher {
            prefix: parse_dotted(prefix),
            column: column.to_string(),
        }
    }
}

impl VariableMatcher for AclGroupMatcher {
    fn name(&self) -> String {
        format!("acl group {}", to_dotted(&self.prefix))
    }

    fn convert(&self, path: &[PathSegment]) -> Option<Node> {
        let rest = path.strip_prefix(self.prefix.as_slice())?;
        let (group, rest) = rest.split_first()?;
        let PathSegment::Field(group) = group else {
            return None;
        };

        let sql = format!(
            "ARRAY(SELECT jsonb_array_elements_text({}->{}))",
            self.column,
            quote_literal(group)
        );
        column_or_element(sql, &VarType::array(VarType::String), rest)
    }
}

/// Resolves paths through a [`VariableTree`] of declarations.
///
/// Segments past the matched declaration project into it according to its
/// declared type:
///
/// ```text
/// array + [_]  → any element of the column
/// array + [i]  → name[i + 1]      (SQL arrays are 1-based)
/// map   + key  → name->>'key'     (static names only; boolean and number
///                                   values are cast back)
/// ```
///
/// Pattern namers receive the dotted path instead and do their own projection.
#[derive(Debug, Clone)]
pub struct TreeMatcher {
    tree: VariableTree,
}

impl TreeMatcher {
    pub fn new(tree: VariableTree) -> Self {
        TreeMatcher { tree }
    }

    pub fn tree(&self) -> &VariableTree {
        &self.tree
    }
}

/// Type reached by following `rest` into `ty`.
fn descend(ty: &VarType, rest: &[PathSegment]) -> Option<VarType> {
    let mut current = ty;
    for segment in rest {
        current = match (current, segment) {
            (VarType::Array(element), PathSegment::Index(_)) => element,
            (VarType::Map(value), PathSegment::Field(_) | PathSegment::Index(_)) => value,
            _ => return None,
        };
    }
    Some(current.clone())
}

fn static_projection(name: &str, ty: &VarType, rest: &[PathSegment]) -> Option<String> {
    match (ty, rest) {
        (_, []) => Some(name.to_string()),
        (VarType::Array(_), [PathSegment::Index(i)]) if *i >= 0 => Some(format!("{}[{}]", name, i.checked_add(1)?)),
        (VarType::Map(value), [segment]) => {
            let key = quote_literal(&segment.key()?);
            // `->>` yields text; other scalars are cast back to their declared type.
            Some(match value.as_ref() {
                VarType::String => format!("{}->>{}", name, key),
                VarType::Boolean => format!("({}->>{})::boolean", name, key),
                VarType::Number => format!("({}->>{})::numeric", name, key),
                VarType::Array(_) | VarType::Map(_) => format!("{}->{}", name, key),
            })
        }
        _ => None,
    }
}

/// Dotted path handed to pattern namers, with quotes in keys escaped.
fn pattern_input(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| segment.to_string().replace('\'', "''"))
        .collect::<Vec<_>>()
        .join(".")
}

impl TreeMatcher {
    fn project(&self, path: &[PathSegment], found: Lookup<'_, '_>) -> Option<Node> {
        let declaration = found.declaration;

        // A trailing wildcard addresses any element of the array before it.
        let (addressed, rest, any_element) = match found.rest.split_last() {
            Some((last, init)) if last.is_wildcard() => (&path[..path.len() - 1], init, true),
            _ => (path, found.rest, false),
        };

        let ty = descend(&declaration.ty, rest)?;
        if any_element && !ty.is_array() {
            return None;
        }

        let sql = match &declaration.namer {
            ColumnNamer::Static(name) => static_projection(name, &declaration.ty, rest)?,
            namer @ ColumnNamer::Pattern { .. } => namer.name(&pattern_input(addressed))?,
        };

        if any_element {
            Some(Node::any_element(sql, ty))
        } else {
            Some(Node::column(sql, ty))
        }
    }
}

impl VariableMatcher for TreeMatcher {
    fn name(&self) -> String {
        format!("variable tree ({} declarations)", self.tree.len())
    }

    fn convert(&self, path: &[PathSegment]) -> Option<Node> {
        let found = self.tree.lookup(path)?;
        self.project(path, found)
    }
}

/// Ordered list of matchers; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct VariableConverter {
    matchers: Vec<SharedMatcher>,
}

impl VariableConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a matcher, builder style.
    pub fn with_matcher(mut self, matcher: impl VariableMatcher + 'static) -> Self {
        self.matchers.push(Arc::new(matcher));
        self
    }

    /// Convert a variable path with the first matcher that handles it.
    pub fn convert(&self, path: &[PathSegment]) -> Option<Node> {
        for matcher in &self.matchers {
            if let Some(node) = matcher.convert(path) {
                log::trace!("{} resolved by {}", to_dotted(path), matcher.name());
                return Some(node);
            }
        }
        log::debug!("no matcher resolves {}", to_dotted(path));
        None
    }

    pub fn matcher_names(&self) -> Vec<String> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// A fixed set of matchers, each tagged with a feature group.
///
/// Converters are derived from the set by naming the groups to include, so
/// variations such as "with ACL groups" and "without" share one definition.
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    entries: Vec<(String, SharedMatcher)>,
}

impl MatcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a matcher to `group`, builder style.
    pub fn with(mut self, group: &str, matcher: impl VariableMatcher + 'static) -> Self {
        self.entries.push((group.to_string(), Arc::new(matcher)));
        self
    }

    /// Group names in first-registration order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for (group, _) in &self.entries {
            if !groups.contains(&group.as_str()) {
                groups.push(group.as_str());
            }
        }
        groups
    }

    /// Converter with the matchers of the included groups, in set order.
    pub fn converter(&self, include: &[&str]) -> VariableConverter {
        self.filtered(|group| include.contains(&group))
    }

    /// Converter with every group except the excluded ones.
    pub fn converter_without(&self, exclude: &[&str]) -> VariableConverter {
        self.filtered(|group| !exclude.contains(&group))
    }

    fn filtered(&self, keep: impl Fn(&str) -> bool) -> VariableConverter {
        let matchers = self
            .entries
            .iter()
            .filter(|(group, _)| keep(group.as_str()))
            .map(|(_, matcher)| Arc::clone(matcher))
            .collect();
        VariableConverter { matchers }
    }
}
