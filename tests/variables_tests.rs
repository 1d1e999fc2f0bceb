// tests/variables_tests.rs

use regosql::path::{PathSegment, parse_dotted};
use regosql::presets::{self, ACL, CORE};
use regosql::sql::{Kind, Node, SqlGenerator};
use regosql::tree::VariableTree;
use regosql::types::{ColumnNamer, VarType};
use regosql::variables::{AclGroupMatcher, ColumnMatcher, MatcherSet, TreeMatcher, VariableMatcher};

fn sql(node: &Node) -> String {
    let mut generator = SqlGenerator::new();
    node.render(&mut generator)
}

fn with_wildcard(dotted: &str) -> Vec<PathSegment> {
    let mut path = parse_dotted(dotted);
    path.push(PathSegment::Wildcard("_".into()));
    path
}

fn posts_matcher() -> TreeMatcher {
    let tree = VariableTree::new()
        .declare("input.post.author", VarType::String, ColumnNamer::fixed("author"))
        .unwrap()
        .declare("input.post.deleted", VarType::Boolean, ColumnNamer::fixed("deleted"))
        .unwrap()
        .declare("input.post.moderators", VarType::array(VarType::String), ColumnNamer::fixed("moderators"))
        .unwrap()
        .declare("input.post.meta", VarType::map(VarType::String), ColumnNamer::fixed("meta"))
        .unwrap()
        .declare("input.post.flags", VarType::map(VarType::Boolean), ColumnNamer::fixed("flags"))
        .unwrap()
        .declare("input.post.scores", VarType::map(VarType::Number), ColumnNamer::fixed("scores"))
        .unwrap()
        .declare(
            "input.post.nested",
            VarType::map(VarType::array(VarType::String)),
            ColumnNamer::fixed("nested"),
        )
        .unwrap()
        .declare(
            "input.post.authors",
            VarType::map(VarType::String),
            ColumnNamer::pattern(r"^input\.post\.authors\.(.+)$", "authors->'$1'").unwrap(),
        )
        .unwrap();
    TreeMatcher::new(tree)
}

// ============================================================================
// Tree Matcher
// ============================================================================

#[test]
fn test_tree_whole_column() {
    let matcher = posts_matcher();

    let node = matcher.convert(&parse_dotted("input.post.author")).unwrap();
    assert_eq!(sql(&node), "author");
    assert_eq!(node.kind(), Kind::String);

    let node = matcher.convert(&parse_dotted("input.post.deleted")).unwrap();
    assert_eq!(node.kind(), Kind::Predicate);
}

#[test]
fn test_tree_any_element() {
    let matcher = posts_matcher();
    let node = matcher.convert(&with_wildcard("input.post.moderators")).unwrap();

    assert_eq!(sql(&node), "moderators");
    assert_eq!(node.kind(), Kind::AnyElement);
}

#[test]
fn test_tree_wildcard_on_scalar_is_unsupported() {
    let matcher = posts_matcher();
    assert!(matcher.convert(&with_wildcard("input.post.author")).is_none());
}

#[test]
fn test_tree_array_index_is_one_based() {
    let matcher = posts_matcher();
    let mut path = parse_dotted("input.post.moderators");
    path.push(PathSegment::Index(0));

    let node = matcher.convert(&path).unwrap();
    assert_eq!(sql(&node), "moderators[1]");
    assert_eq!(node.kind(), Kind::String);
}

#[test]
fn test_tree_array_index_past_subscript_range() {
    let matcher = posts_matcher();
    let mut path = parse_dotted("input.post.moderators");
    path.push(PathSegment::Index(i64::MAX));

    assert!(matcher.convert(&path).is_none());

    path.pop();
    path.push(PathSegment::Index(i64::MAX - 1));
    assert_eq!(sql(&matcher.convert(&path).unwrap()), format!("moderators[{}]", i64::MAX));
}

#[test]
fn test_tree_map_key() {
    let matcher = posts_matcher();

    let node = matcher.convert(&parse_dotted("input.post.meta.title")).unwrap();
    assert_eq!(sql(&node), "meta->>'title'");
    assert_eq!(node.kind(), Kind::String);

    let node = matcher.convert(&parse_dotted("input.post.meta.o'brien")).unwrap();
    assert_eq!(sql(&node), "meta->>'o''brien'");

    let node = matcher.convert(&parse_dotted("input.post.nested.tags")).unwrap();
    assert_eq!(sql(&node), "nested->'tags'");
    assert_eq!(node.kind(), Kind::Array);
}

#[test]
fn test_tree_map_scalar_values_are_cast() {
    let matcher = posts_matcher();

    let node = matcher.convert(&parse_dotted("input.post.flags.x")).unwrap();
    assert_eq!(sql(&node), "(flags->>'x')::boolean");
    assert_eq!(node.kind(), Kind::Predicate);

    let node = matcher.convert(&parse_dotted("input.post.scores.x")).unwrap();
    assert_eq!(sql(&node), "(scores->>'x')::numeric");
    assert_eq!(node.kind(), Kind::Number);
}

#[test]
fn test_tree_pattern_namer() {
    let matcher = posts_matcher();
    let node = matcher.convert(&parse_dotted("input.post.authors.name")).unwrap();

    assert_eq!(sql(&node), "authors->'name'");
    assert_eq!(node.declared_type(), Some(&VarType::String));
}

#[test]
fn test_tree_unknown_path() {
    let matcher = posts_matcher();

    assert!(matcher.convert(&parse_dotted("input.post.title")).is_none());
    assert!(matcher.convert(&parse_dotted("input.post.author.first")).is_none());
}

// ============================================================================
// Column and ACL Matchers
// ============================================================================

#[test]
fn test_column_matcher() {
    let matcher = ColumnMatcher::new("input.object.owner", "owner_id :: text", VarType::String);

    let node = matcher.convert(&parse_dotted("input.object.owner")).unwrap();
    assert_eq!(sql(&node), "owner_id :: text");
    assert!(matcher.convert(&parse_dotted("input.object")).is_none());
    assert!(matcher.convert(&parse_dotted("input.object.owner.id")).is_none());
}

#[test]
fn test_acl_group_matcher() {
    let matcher = AclGroupMatcher::new("input.object.acl_group_list", "group_acl");

    let node = matcher.convert(&parse_dotted("input.object.acl_group_list.admins")).unwrap();
    assert_eq!(sql(&node), "ARRAY(SELECT jsonb_array_elements_text(group_acl->'admins'))");
    assert_eq!(node.declared_type(), Some(&VarType::array(VarType::String)));

    let node = matcher.convert(&with_wildcard("input.object.acl_group_list.admins")).unwrap();
    assert_eq!(node.kind(), Kind::AnyElement);

    assert!(matcher.convert(&parse_dotted("input.object.acl_group_list")).is_none());
}

// ============================================================================
// Converter Composition
// ============================================================================

#[test]
fn test_first_match_wins() {
    let set = MatcherSet::new()
        .with("a", ColumnMatcher::new("input.x", "first", VarType::String))
        .with("b", ColumnMatcher::new("input.x", "second", VarType::String));

    let converter = set.converter(&["a", "b"]);
    assert_eq!(sql(&converter.convert(&parse_dotted("input.x")).unwrap()), "first");

    let converter = set.converter(&["b"]);
    assert_eq!(sql(&converter.convert(&parse_dotted("input.x")).unwrap()), "second");
}

#[test]
fn test_inclusion_keeps_set_order() {
    let set = MatcherSet::new()
        .with("a", ColumnMatcher::new("input.x", "first", VarType::String))
        .with("b", ColumnMatcher::new("input.x", "second", VarType::String));

    let converter = set.converter(&["b", "a"]);
    assert_eq!(sql(&converter.convert(&parse_dotted("input.x")).unwrap()), "first");
}

#[test]
fn test_groups() {
    assert_eq!(presets::matcher_set().groups(), vec![CORE, ACL]);
}

#[test]
fn test_default_and_no_acl_converters() {
    let acl_path = parse_dotted("input.object.acl_group_list.admins");
    let owner_path = parse_dotted("input.object.owner");

    let default = presets::default_converter();
    assert_eq!(default.len(), 4);
    assert!(default.convert(&acl_path).is_some());
    assert!(default.convert(&owner_path).is_some());

    let no_acl = presets::no_acl_converter();
    assert_eq!(no_acl.len(), 2);
    assert!(no_acl.convert(&acl_path).is_none());
    assert_eq!(sql(&no_acl.convert(&owner_path).unwrap()), "owner_id :: text");
}

#[test]
fn test_converter_is_shared_not_rebuilt() {
    let converter = presets::default_converter();
    let copy = converter.clone();

    assert_eq!(converter.matcher_names(), copy.matcher_names());
    assert!(copy.convert(&parse_dotted("input.object.org_owner")).is_some());
}
