// tests/lexer_tests.rs

use regosql::ast::Token;
use regosql::lexer::{Lexer, Position};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        if token == Token::Eof {
            return out;
        }
        out.push(token);
    }
}

// ============================================================================
// Punctuation and Operators
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        (".", Token::Dot),
        (",", Token::Comma),
        (";", Token::Semicolon),
        ("\n", Token::Newline),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        ("=", Token::Eq),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {:?}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_two_char_tokens() {
    assert_eq!(tokens("=="), vec![Token::EqEq]);
    assert_eq!(tokens("!="), vec![Token::NotEq]);
}

#[test]
fn test_lone_bang_is_error() {
    let mut lexer = Lexer::new("!x");
    let err = lexer.next_token().unwrap_err();
    assert!(err.message.contains("!="));
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers_kept_verbatim() {
    let test_cases = vec!["0", "42", "-7", "3.14", "-0.5", "1e10", "2.5E-3", "1e+6"];

    for input in test_cases {
        assert_eq!(tokens(input), vec![Token::Number(input.to_string())], "Failed for {}", input);
    }
}

#[test]
fn test_dot_after_number_is_not_fraction() {
    assert_eq!(tokens("1.x"), vec![
        Token::Number("1".into()),
        Token::Dot,
        Token::Identifier("x".into()),
    ]);
}

#[test]
fn test_strings_and_escapes() {
    assert_eq!(tokens(r#""bob""#), vec![Token::String("bob".into())]);
    assert_eq!(tokens(r#""a\"b""#), vec![Token::String("a\"b".into())]);
    assert_eq!(tokens(r#""tab\there""#), vec![Token::String("tab\there".into())]);
    assert_eq!(tokens(r#""é""#), vec![Token::String("é".into())]);
    assert_eq!(tokens(r#""it's""#), vec![Token::String("it's".into())]);
}

#[test]
fn test_unterminated_string() {
    let mut lexer = Lexer::new("\"open");
    let err = lexer.next_token().unwrap_err();
    assert!(err.message.contains("Unterminated"));
    assert_eq!(err.position, Position { line: 1, column: 1 });
}

#[test]
fn test_keywords() {
    assert_eq!(tokens("true false null not"), vec![
        Token::Boolean(true),
        Token::Boolean(false),
        Token::Null,
        Token::Not,
    ]);
}

#[test]
fn test_identifiers() {
    assert_eq!(tokens("input _ member_2 truthy"), vec![
        Token::Identifier("input".into()),
        Token::Identifier("_".into()),
        Token::Identifier("member_2".into()),
        Token::Identifier("truthy".into()),
    ]);
}

// ============================================================================
// Whole Expressions
// ============================================================================

#[test]
fn test_reference_tokens() {
    assert_eq!(tokens(r#"input.post.authors["name"]"#), vec![
        Token::Identifier("input".into()),
        Token::Dot,
        Token::Identifier("post".into()),
        Token::Dot,
        Token::Identifier("authors".into()),
        Token::LBracket,
        Token::String("name".into()),
        Token::RBracket,
    ]);
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(tokens("x # trailing comment\ny"), vec![
        Token::Identifier("x".into()),
        Token::Newline,
        Token::Identifier("y".into()),
    ]);
}

#[test]
fn test_token_positions() {
    let mut lexer = Lexer::new("a = 1\n  b");
    let expected = [
        (Token::Identifier("a".into()), 1, 1),
        (Token::Eq, 1, 3),
        (Token::Number("1".into()), 1, 5),
        (Token::Newline, 1, 6),
        (Token::Identifier("b".into()), 2, 3),
    ];

    for (token, line, column) in expected {
        assert_eq!(lexer.next_token().unwrap(), token);
        assert_eq!(lexer.token_start(), Position { line, column });
    }
}

#[test]
fn test_unexpected_character() {
    let mut lexer = Lexer::new("a $ b");
    lexer.next_token().unwrap();
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.position, Position { line: 1, column: 3 });
    assert_eq!(err.to_string(), "Unexpected character '$' at line 1, column 3");
}
