use clap::{Parser as ClapParser, Subcommand};
use rql::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use tracing::Level;

#[derive(ClapParser)]
#[command(name = "rql")]
#[command(about = "RQL - parse and serialize resource query language expressions")]
#[command(version)]
struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and print its operator tree as JSON
    Parse {
        /// The RQL query to parse
        query: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Check that a query parses, without printing the tree
    Check {
        /// The RQL query to check
        query: String,
    },

    /// Rewrite infix comparisons into call syntax
    Normalize {
        /// The RQL query to normalize
        query: String,
    },

    /// Render a JSON operator tree as query text
    Serialize {
        /// JSON tree (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Parse { query, pretty } => run_check(query, pretty, false),
        Commands::Check { query } => run_check(query, false, true),
        Commands::Normalize { query } => cli::execute_normalize(&query).map(|normalized| {
            println!("{}", normalized);
        }),
        Commands::Serialize { input } => run_serialize(input),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(query: String, pretty: bool, syntax_only: bool) -> Result<(), CliError> {
    let options = CheckOptions { query, syntax_only };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn run_serialize(input: Option<String>) -> Result<(), CliError> {
    let input = match input {
        Some(s) => s,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        None => return Err(CliError::NoInput),
    };

    println!("{}", cli::execute_serialize(&input)?);
    Ok(())
}
