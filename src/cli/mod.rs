//! CLI support for regosql
//!
//! Provides programmatic access to the `compile` command so other tools can
//! embed it without going through the binary.

mod compile;

pub use compile::{CompileOptions, CompileResult, InputFormat, execute_compile, read_partial_queries};

use std::{error::Error, fmt, io};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Text residual syntax error
    Parse(crate::ParseError),
    /// JSON residual encoding error
    Decode(crate::DecodeError),
    /// Compilation error
    Compile(crate::CompileError),
    /// Configuration error
    Config(crate::ConfigError),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Decode(e) => write!(f, "Invalid residual: {}", e),
            CliError::Compile(e) => write!(f, "Compile error: {}", e),
            CliError::Config(e) => write!(f, "Config error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Pass RESIDUAL or pipe it to stdin."),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Decode(e) => Some(e),
            CliError::Compile(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<crate::DecodeError> for CliError {
    fn from(e: crate::DecodeError) -> Self {
        CliError::Decode(e)
    }
}

impl From<crate::CompileError> for CliError {
    fn from(e: crate::CompileError) -> Self {
        CliError::Compile(e)
    }
}

impl From<crate::ConfigError> for CliError {
    fn from(e: crate::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// The error followed by its causes, one per line.
///
/// The wrapped error is already part of the top-level message, so the chain
/// starts at its own source.
pub fn error_chain(error: &CliError) -> String {
    let mut out = error.to_string();
    let mut cause = error.source().and_then(|e| e.source());
    while let Some(e) = cause {
        out.push_str("\n  caused by: ");
        out.push_str(&e.to_string());
        cause = e.source();
    }
    out
}
