pub mod ast;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod decode;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod presets;
pub mod sql;
pub mod tree;
pub mod types;
pub mod variables;

pub use ast::{Expr, ExprTerms, PartialQueries, Query, Term, Token};
pub use compiler::{CompileConfig, CompileError, compile_sql, convert_partial};
pub use config::{Config, ConfigError};
pub use decode::{DecodeError, partial_queries_from_json};
pub use lexer::{LexError, Lexer, Position};
pub use parser::{ParseError, Parser, parse_partial_queries};
pub use path::{Path, PathError, PathSegment};
pub use sql::{GenerateError, Node, SqlGenerator};
pub use tree::{TreeError, VariableTree};
pub use types::{ColumnNamer, VarType};
pub use variables::{MatcherSet, VariableConverter, VariableMatcher};
