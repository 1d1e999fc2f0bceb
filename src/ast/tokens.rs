#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Number literal, kept as the exact source text
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -3.14
    /// 1e10
    /// ```
    Number(String),

    /// String literal enclosed in double quotes
    ///
    /// # Examples
    /// ```text
    /// "bob"
    /// "edit"
    /// ```
    String(String),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    /// Null value
    Null,

    // Identifiers and keywords
    /// Variable or field name
    ///
    /// Must start with letter or underscore, followed by letters, digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// input
    /// acl_group_list
    /// _
    /// ```
    Identifier(String),

    /// Expression negation keyword (`not`)
    Not,

    // Comparison
    /// Unification (`=`)
    Eq,
    /// Equality (`==`)
    EqEq,
    /// Inequality (`!=`)
    NotEq,

    // Punctuation
    /// Field access separator (`.`)
    Dot,
    /// Element separator (`,`)
    Comma,
    /// Expression separator within a query (`;`)
    Semicolon,
    /// Query separator
    Newline,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    /// End of input
    Eof,
}

impl Token {
    /// Short description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::String(s) => format!("string {:?}", s),
            Token::Boolean(b) => b.to_string(),
            Token::Null => "null".to_string(),
            Token::Identifier(name) => format!("identifier `{}`", name),
            Token::Not => "`not`".to_string(),
            Token::Eq => "`=`".to_string(),
            Token::EqEq => "`==`".to_string(),
            Token::NotEq => "`!=`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Semicolon => "`;`".to_string(),
            Token::Newline => "end of line".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}
