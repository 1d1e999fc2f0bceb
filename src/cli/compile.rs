//! Compile residual queries into a SQL predicate

use super::CliError;
use crate::{CompileConfig, Config, DecodeError, PartialQueries, compile_sql, parse_partial_queries, partial_queries_from_json, presets};

/// How the residual input is encoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// JSON when the input starts with `{` or `[` and parses as JSON, text otherwise
    #[default]
    Auto,
    Json,
    Text,
}

/// Options for the compile command
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Residual queries, JSON or text
    pub residual: Option<String>,
    pub format: InputFormat,
    /// JSON configuration; the built-in converter when absent
    pub config: Option<String>,
    /// Only read the residual, don't compile
    pub syntax_only: bool,
}

/// Result of a compile operation
#[derive(Debug, PartialEq)]
pub enum CompileResult {
    /// The residual was read successfully
    SyntaxValid,
    /// SQL predicate
    Sql(String),
}

/// Read residual queries in the given format.
///
/// In `Auto` mode, input that starts like JSON but is not JSON at all (for
/// example `["a"] = input.post.tags`) is read as text. Well-formed JSON with
/// the wrong shape is still reported as a decode error.
pub fn read_partial_queries(input: &str, format: InputFormat) -> Result<PartialQueries, CliError> {
    match format {
        InputFormat::Json => Ok(partial_queries_from_json(input)?),
        InputFormat::Text => Ok(parse_partial_queries(input)?),
        InputFormat::Auto if input.trim_start().starts_with(['{', '[']) => {
            match partial_queries_from_json(input) {
                Ok(partial) => Ok(partial),
                Err(json_err @ DecodeError::Json(_)) => {
                    log::debug!("input is not JSON ({}), reading it as text", json_err);
                    parse_partial_queries(input).map_err(|_| CliError::Decode(json_err))
                }
                Err(e) => Err(e.into()),
            }
        }
        InputFormat::Auto => Ok(parse_partial_queries(input)?),
    }
}

/// Execute a regosql compile operation
pub fn execute_compile(options: &CompileOptions) -> Result<CompileResult, CliError> {
    let input = options.residual.as_ref().ok_or(CliError::NoInput)?;
    let partial = read_partial_queries(input, options.format)?;

    if options.syntax_only {
        return Ok(CompileResult::SyntaxValid);
    }

    let config = match &options.config {
        Some(json) => Config::from_json(json)?.compile_config()?,
        None => CompileConfig::new(presets::default_converter()),
    };

    let sql = compile_sql(&config, &partial)?;
    Ok(CompileResult::Sql(sql))
}
