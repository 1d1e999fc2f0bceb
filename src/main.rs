use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use regosql::cli::{self, CliError, CompileOptions, CompileResult, InputFormat};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

#[derive(ClapParser)]
#[command(name = "regosql")]
#[command(about = "regosql - Compile partially evaluated Rego policies into SQL WHERE predicates")]
#[command(version)]
struct Cli {
    /// Log compilation steps (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Auto,
    Json,
    Text,
}

impl From<Format> for InputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Auto => InputFormat::Auto,
            Format::Json => InputFormat::Json,
            Format::Text => InputFormat::Text,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile residual queries into a SQL predicate
    Compile {
        /// Residual queries (reads from stdin if not provided)
        residual: Option<String>,

        /// JSON configuration file (built-in columns if not provided)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Residual encoding
        #[arg(short, long, value_enum, default_value = "auto")]
        format: Format,

        /// Only validate the residual, don't compile
        #[arg(long)]
        syntax_only: bool,
    },
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            residual,
            config,
            format,
            syntax_only,
        } => run_compile(residual, config, format, syntax_only),
    };

    if let Err(e) = result {
        eprintln!("{}", cli::error_chain(&e));
        std::process::exit(1);
    }
}

fn run_compile(
    residual: Option<String>,
    config: Option<PathBuf>,
    format: Format,
    syntax_only: bool,
) -> Result<(), CliError> {
    let residual = match residual {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };

    let config = config.map(fs::read_to_string).transpose()?;

    let options = CompileOptions {
        residual,
        format: format.into(),
        config,
        syntax_only,
    };

    match cli::execute_compile(&options)? {
        CompileResult::SyntaxValid => println!("Syntax is valid"),
        CompileResult::Sql(sql) => println!("{}", sql),
    }
    Ok(())
}
