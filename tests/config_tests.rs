// tests/config_tests.rs

use regosql::compiler::{CompileError, compile_sql};
use regosql::config::{Config, ConfigError};
use regosql::parser::parse_partial_queries;
use regosql::tree::TreeError;

const POSTS: &str = r#"{
    "columns": [
        { "path": "input.post.author", "type": "string", "column": "author" },
        { "path": "input.post.tags", "type": { "array": "string" }, "column": "tags" },
        { "path": "input.post.authors", "type": { "map": "string" },
          "pattern": { "regex": "^input\\.post\\.authors\\.(.+)$", "replace": "authors->'$1'" } }
    ],
    "exact": [
        { "path": "input.object.team", "type": "string", "column": "team_id :: text" }
    ]
}"#;

fn compile_with(config: &str, residual: &str) -> Result<String, CompileError> {
    let config = Config::from_json(config).unwrap().compile_config().unwrap();
    compile_sql(&config, &parse_partial_queries(residual).unwrap())
}

#[test]
fn test_columns_and_exact() {
    assert_eq!(
        compile_with(POSTS, r#""bob" = input.post.author; "t1" = input.object.team"#).unwrap(),
        "author = 'bob' AND team_id :: text = 't1'"
    );
    assert_eq!(
        compile_with(POSTS, r#"internal.member_2(input.post.tags, ["a"])"#).unwrap(),
        "tags && ARRAY['a']"
    );
    assert_eq!(
        compile_with(POSTS, r#"input.post.authors["name"] = "bob""#).unwrap(),
        "authors->'name' = 'bob'"
    );
}

#[test]
fn test_presets_are_opt_in() {
    let residual = r#""me" = input.object.owner"#;

    assert!(compile_with(POSTS, residual).is_err());

    let with_presets = r#"{ "presets": true }"#;
    assert_eq!(compile_with(with_presets, residual).unwrap(), "owner_id :: text = 'me'");
}

#[test]
fn test_disable_groups() {
    let config = r#"{
        "presets": true,
        "acl_groups": [{ "prefix": "input.object.acl_role_list", "column": "role_acl" }],
        "disable": ["acl"]
    }"#;
    let residual = r#""x" = input.object.acl_role_list.admins[_]"#;

    assert!(compile_with(config, residual).is_err());

    let enabled = config.replace(r#""disable": ["acl"]"#, r#""disable": []"#);
    assert_eq!(
        compile_with(&enabled, residual).unwrap(),
        "'x' = ANY(ARRAY(SELECT jsonb_array_elements_text(role_acl->'admins')))"
    );
}

#[test]
fn test_matcher_groups() {
    let config = Config::from_json(POSTS).unwrap();
    assert_eq!(config.matcher_set().unwrap().groups(), vec!["core", "columns"]);

    let config = Config::from_json(r#"{ "presets": true }"#).unwrap();
    assert_eq!(config.matcher_set().unwrap().groups(), vec!["core", "acl"]);
}

#[test]
fn test_empty_config() {
    let config = Config::from_json("{}").unwrap();
    let compile = config.compile_config().unwrap();

    let converter = compile.variable_converter.unwrap();
    assert!(converter.is_empty());
}

// ============================================================================
// Invalid Configurations
// ============================================================================

#[test]
fn test_unknown_field() {
    let err = Config::from_json(r#"{ "colums": [] }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_unknown_type() {
    let err = Config::from_json(r#"{ "columns": [{ "path": "input.x", "type": "date", "column": "x" }] }"#)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_column_or_pattern_required() {
    let config = Config::from_json(r#"{ "columns": [{ "path": "input.x", "type": "string" }] }"#).unwrap();
    let err = config.compile_config().unwrap_err();
    assert!(matches!(err, ConfigError::Namer(path) if path == "input.x"));
}

#[test]
fn test_invalid_regex() {
    let config = Config::from_json(
        r#"{ "columns": [{ "path": "input.x", "type": "string", "pattern": { "regex": "(", "replace": "x" } }] }"#,
    )
    .unwrap();
    let err = config.compile_config().unwrap_err();
    assert!(matches!(err, ConfigError::Regex { .. }));
}

#[test]
fn test_tree_errors_surface() {
    let config = Config::from_json(
        r#"{ "columns": [
            { "path": "input.x", "type": "string", "column": "x" },
            { "path": "input.x", "type": "string", "column": "y" }
        ] }"#,
    )
    .unwrap();
    let err = config.compile_config().unwrap_err();
    assert!(matches!(err, ConfigError::Tree(TreeError::Duplicate { .. })));
}
