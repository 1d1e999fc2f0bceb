use std::mem;

use thiserror::Error;

use crate::{
    ast::{Expr, ExprTerms, PartialQueries, Query, Term, Token},
    lexer::{LexError, Lexer, Position},
};

/// Errors produced while parsing residual query text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{message} at {position}")]
    Syntax { message: String, position: Position },
}

/// Recursive-descent parser for the textual form of a residual query set.
///
/// One query per line, expressions separated by `;`:
///
/// ```text
/// "bob" = input.post.author; input.post.deleted
/// internal.member_2(input.post.can, ["edit", "*"])
/// ```
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    position: Position,
    /// Bracket nesting depth; newlines are insignificant inside brackets.
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let position = lexer.token_start();
        Ok(Parser {
            lexer,
            current_token,
            position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        loop {
            self.current_token = self.lexer.next_token()?;
            self.position = self.lexer.token_start();
            if !(self.depth > 0 && self.current_token == Token::Newline) {
                return Ok(());
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            position: self.position,
        }
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.error(format!(
                "Expected {}, got {}",
                expected.describe(),
                self.current_token.describe()
            )));
        }
        self.advance()
    }

    /// Consume an opening bracket; the caller has already checked it.
    fn open(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        self.advance()
    }

    fn close(&mut self, closing: Token) -> Result<(), ParseError> {
        if !self.check(&closing) {
            return Err(self.error(format!(
                "Expected {}, got {}",
                closing.describe(),
                self.current_token.describe()
            )));
        }
        self.depth = self.depth.saturating_sub(1);
        self.advance()
    }

    fn skip_newlines(&mut self) -> Result<(), ParseError> {
        while self.check(&Token::Newline) {
            self.advance()?;
        }
        Ok(())
    }

    /// Parse a complete residual query set, one query per line.
    ///
    /// Blank lines and `#` comments are ignored.
    pub fn parse(&mut self) -> Result<PartialQueries, ParseError> {
        let mut queries = vec![];

        self.skip_newlines()?;
        while !self.check(&Token::Eof) {
            queries.push(self.parse_query()?);

            if !self.check(&Token::Eof) {
                self.expect(Token::Newline)?;
            }
            self.skip_newlines()?;
        }

        Ok(PartialQueries::new(queries))
    }

    /// Parse one query: expressions separated by `;`, a trailing `;` allowed.
    pub fn parse_query(&mut self) -> Result<Query, ParseError> {
        let mut exprs = vec![self.parse_expression()?];

        while self.check(&Token::Semicolon) {
            self.advance()?;
            if self.check(&Token::Newline) || self.check(&Token::Eof) {
                break;
            }
            exprs.push(self.parse_expression()?);
        }

        Ok(Query::new(exprs))
    }

    /// Parse one expression: a bare term, a call, or an infix comparison.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let negated = self.check(&Token::Not);
        if negated {
            self.advance()?;
        }

        let left = self.parse_term()?;

        let op = match &self.current_token {
            Token::Eq => Some("eq"),
            Token::EqEq => Some("equal"),
            Token::NotEq => Some("neq"),
            _ => None,
        };

        let mut expr = match op {
            Some(op) => {
                self.advance()?;
                let right = self.parse_term()?;
                Expr::call(op, vec![left, right])
            }
            None => match left {
                Term::Call(terms) => Expr {
                    terms: ExprTerms::Call(terms),
                    negated: false,
                },
                term => Expr::term(term),
            },
        };
        expr.negated = negated;
        Ok(expr)
    }

    /// Parse a single term.
    pub fn parse_term(&mut self) -> Result<Term, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::Number(n) => {
                self.advance()?;
                Ok(Term::Number(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Term::String(s))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Term::Boolean(b))
            }
            Token::Null => {
                self.advance()?;
                Ok(Term::Null)
            }

            // Variables, references and calls
            Token::Identifier(name) => {
                self.advance()?;
                self.parse_ref(name)
            }

            // Collections
            Token::LBracket => {
                self.open()?;
                Ok(Term::Array(self.parse_elements(Token::RBracket)?))
            }
            Token::LBrace => {
                self.open()?;
                Ok(Term::Set(self.parse_elements(Token::RBrace)?))
            }

            Token::LParen => {
                self.open()?;
                let term = self.parse_term()?;
                self.close(Token::RParen)?;
                Ok(term)
            }

            token => Err(self.error(format!("Unexpected {}", token.describe()))),
        }
    }

    fn parse_elements(&mut self, closing: Token) -> Result<Vec<Term>, ParseError> {
        let mut elements = vec![];

        while !self.check(&closing) {
            elements.push(self.parse_term()?);

            if !self.check(&closing) {
                self.expect(Token::Comma)?;
            }
        }

        self.close(closing)?;
        Ok(elements)
    }

    /// Parse the segments following a variable head.
    ///
    /// `x` alone is a variable, `x.y[0]` a reference and `x.y(...)` a call.
    fn parse_ref(&mut self, head: String) -> Result<Term, ParseError> {
        let mut segments = vec![Term::Var(head)];

        loop {
            if self.check(&Token::Dot) {
                self.advance()?; // consume '.'

                // Keywords are valid field names after a dot
                let name = match &self.current_token {
                    Token::Identifier(n) => n.clone(),
                    Token::Boolean(b) => b.to_string(),
                    Token::Null => "null".to_string(),
                    Token::Not => "not".to_string(),
                    other => {
                        return Err(
                            self.error(format!("Expected field name after '.', got {}", other.describe()))
                        );
                    }
                };
                self.advance()?;
                segments.push(Term::String(name));
            } else if self.check(&Token::LBracket) {
                self.open()?;
                let key = self.parse_term()?;
                self.close(Token::RBracket)?;
                segments.push(key);
            } else if self.check(&Token::LParen) {
                self.open()?;
                let args = self.parse_elements(Token::RParen)?;

                if args.is_empty() && segments == [Term::var("set")] {
                    return Ok(Term::Set(vec![]));
                }

                let mut terms = Vec::with_capacity(args.len() + 1);
                terms.push(Term::Ref(segments));
                terms.extend(args);
                return Ok(Term::Call(terms));
            } else {
                break;
            }
        }

        if segments.len() == 1 {
            Ok(segments.remove(0))
        } else {
            Ok(Term::Ref(segments))
        }
    }
}

/// Parse a residual query set from its textual form.
pub fn parse_partial_queries(input: &str) -> Result<PartialQueries, ParseError> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}
