use clap::{Parser as ClapParser, Subcommand};
use sieve_lang::cli::{self, CheckOptions, CheckResult, CliError, FilterOptions};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

#[derive(ClapParser)]
#[command(name = "sieve")]
#[command(about = "Sieve - compile filter expressions against an entity schema")]
#[command(version)]
struct Cli {
    /// Log compilation details (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a filter and print the condition it compiles to
    Check {
        /// The filter to check
        filter: String,

        /// Schema file (JSON)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Root entity type
        #[arg(short, long, default_value = "")]
        entity: String,

        /// Rename an attribute path prefix before resolution (OLD=NEW)
        #[arg(long = "rename")]
        renames: Vec<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't compile
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the JSON records a filter matches
    Filter {
        /// The filter to apply
        filter: String,

        /// Schema file (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Entity type of the input records
        #[arg(short, long)]
        entity: String,

        /// Rename an attribute path prefix before resolution (OLD=NEW)
        #[arg(long = "rename")]
        renames: Vec<String>,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Check {
            filter,
            schema,
            entity,
            renames,
            pretty,
            syntax_only,
        } => run_check(filter, schema, entity, renames, pretty, syntax_only),
        Commands::Filter {
            filter,
            schema,
            entity,
            renames,
            input,
            pretty,
        } => run_filter(filter, schema, entity, renames, input, pretty),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    filter: String,
    schema: Option<PathBuf>,
    entity: String,
    renames: Vec<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let schema = match schema {
        Some(path) if !syntax_only => Some(fs::read_to_string(path)?),
        _ => None,
    };

    let options = CheckOptions {
        filter,
        schema,
        entity,
        renames,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Compiled { condition, joins } => {
            println!("{}", render(&condition, pretty)?);
            eprintln!("{} join(s)", joins);
        }
    }
    Ok(())
}

fn run_filter(
    filter: String,
    schema: PathBuf,
    entity: String,
    renames: Vec<String>,
    input: Option<String>,
    pretty: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = FilterOptions {
        filter,
        schema: fs::read_to_string(schema)?,
        entity,
        renames,
        input,
    };

    let kept = cli::execute_filter(&options)?;
    println!("{}", render(&serde_json::Value::Array(kept), pretty)?);
    Ok(())
}

fn render(value: &serde_json::Value, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    Ok(json)
}
