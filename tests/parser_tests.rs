// tests/parser_tests.rs

use regosql::ast::query::operator_ref;
use regosql::ast::{Expr, ExprTerms, PartialQueries, Query, Term};
use regosql::lexer::Position;
use regosql::parser::{ParseError, parse_partial_queries};

fn parse_one(input: &str) -> Expr {
    let partial = parse_partial_queries(input).unwrap();
    assert_eq!(partial.queries.len(), 1, "expected one query in {:?}", input);
    let query = &partial.queries[0];
    assert_eq!(query.exprs.len(), 1, "expected one expression in {:?}", input);
    query.exprs[0].clone()
}

fn call_args(expr: &Expr) -> (Term, Vec<Term>) {
    match &expr.terms {
        ExprTerms::Call(terms) => (terms[0].clone(), terms[1..].to_vec()),
        other => panic!("expected call, got {:?}", other),
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_infix_equality() {
    let expr = parse_one(r#"input.post.author = "bob""#);
    let (op, args) = call_args(&expr);

    assert_eq!(op, operator_ref("eq"));
    assert_eq!(args, vec![Term::dotted_ref("input.post.author"), Term::string("bob")]);
    assert!(!expr.negated);
}

#[test]
fn test_infix_operators() {
    let test_cases = vec![("a.b = 1", "eq"), ("a.b == 1", "equal"), ("a.b != 1", "neq")];

    for (input, op) in test_cases {
        let (actual, _) = call_args(&parse_one(input));
        assert_eq!(actual, operator_ref(op), "Failed for {}", input);
    }
}

#[test]
fn test_call_syntax() {
    let expr = parse_one(r#"internal.member_2(input.post.can, ["edit", "*"])"#);
    let (op, args) = call_args(&expr);

    assert_eq!(op, operator_ref("internal.member_2"));
    assert_eq!(args, vec![
        Term::dotted_ref("input.post.can"),
        Term::Array(vec![Term::string("edit"), Term::string("*")]),
    ]);
}

#[test]
fn test_bare_term() {
    let expr = parse_one("input.post.deleted");
    assert_eq!(expr.terms, ExprTerms::Term(Term::dotted_ref("input.post.deleted")));
}

#[test]
fn test_negation() {
    let expr = parse_one("not input.post.deleted");
    assert!(expr.negated);
    assert_eq!(expr.to_string(), "not input.post.deleted");
}

// ============================================================================
// Terms
// ============================================================================

#[test]
fn test_reference_segments() {
    let expr = parse_one(r#"input.post.authors["name"] = input.post.list[0]"#);
    let (_, args) = call_args(&expr);

    assert_eq!(args[0], Term::Ref(vec![
        Term::var("input"),
        Term::string("post"),
        Term::string("authors"),
        Term::string("name"),
    ]));
    assert_eq!(args[1], Term::Ref(vec![
        Term::var("input"),
        Term::string("post"),
        Term::string("list"),
        Term::number("0"),
    ]));
}

#[test]
fn test_wildcard_segment() {
    let expr = parse_one(r#""alice" = input.post.moderators[_]"#);
    let (_, args) = call_args(&expr);

    assert_eq!(args[1], Term::dotted_ref("input.post.moderators._"));
}

#[test]
fn test_keyword_field_names() {
    let expr = parse_one("input.object.null = true");
    let (_, args) = call_args(&expr);

    assert_eq!(args[0], Term::dotted_ref("input.object.null"));
    assert_eq!(args[1], Term::Boolean(true));
}

#[test]
fn test_sets() {
    let (_, args) = call_args(&parse_one(r#"internal.member_2(input.x, {"b", "a"})"#));
    assert_eq!(args[1], Term::Set(vec![Term::string("b"), Term::string("a")]));

    let (_, args) = call_args(&parse_one("internal.member_2(input.x, set())"));
    assert_eq!(args[1], Term::Set(vec![]));
}

#[test]
fn test_literals() {
    let (_, args) = call_args(&parse_one("input.x = [null, -1.5e3, false]"));
    assert_eq!(args[1], Term::Array(vec![Term::Null, Term::number("-1.5e3"), Term::Boolean(false)]));
}

#[test]
fn test_nested_call_term() {
    let (_, args) = call_args(&parse_one("input.x = lower(input.y)"));
    assert_eq!(args[1], Term::Call(vec![operator_ref("lower"), Term::dotted_ref("input.y")]));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_query_per_line() {
    let input = r#"
        # posts bob wrote
        "bob" = input.post.author; input.post.published

        "alice" = input.post.moderators[_];
    "#;
    let partial = parse_partial_queries(input).unwrap();

    assert_eq!(partial.queries.len(), 2);
    assert_eq!(partial.queries[0].exprs.len(), 2);
    assert_eq!(partial.queries[1].exprs.len(), 1);
}

#[test]
fn test_newlines_inside_brackets() {
    let input = "internal.member_2(\n  input.post.can,\n  [\"edit\",\n   \"*\"]\n)";
    let partial = parse_partial_queries(input).unwrap();

    assert_eq!(partial.queries.len(), 1);
}

#[test]
fn test_empty_input() {
    assert_eq!(parse_partial_queries("").unwrap(), PartialQueries::default());
    assert_eq!(parse_partial_queries("\n# nothing\n").unwrap(), PartialQueries::default());
}

#[test]
fn test_display_round_trip() {
    let input = r#""bob" = input.post.author; internal.member_2(input.post.can, ["edit", "*"])"#;
    let partial = parse_partial_queries(input).unwrap();

    assert_eq!(partial.to_string(), input);
    assert_eq!(parse_partial_queries(&partial.to_string()).unwrap(), partial);
}

#[test]
fn test_query_display() {
    let query = Query::new(vec![
        Expr::call("eq", vec![Term::dotted_ref("input.post.author"), Term::string("bob")]),
        Expr::term(Term::dotted_ref("input.post.deleted")),
    ]);
    assert_eq!(query.to_string(), r#"input.post.author = "bob"; input.post.deleted"#);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_closing_bracket() {
    let err = parse_partial_queries("input.x = [1, 2").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    assert!(err.to_string().contains("Expected"));
}

#[test]
fn test_error_position() {
    let err = parse_partial_queries("input.x = 1\ninput.y = ,").unwrap_err();
    match err {
        ParseError::Syntax { position, .. } => assert_eq!(position, Position { line: 2, column: 11 }),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_lex_error_propagates() {
    let err = parse_partial_queries("input.x = \"open").unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)));
}

#[test]
fn test_two_expressions_without_separator() {
    assert!(parse_partial_queries("input.x input.y").is_err());
}
