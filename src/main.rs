use clap::{Parser as ClapParser, Subcommand};
use ql_lang::cli::{self, AstFormat, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "ql")]
#[command(about = "ql - select/where queries over in-memory entity tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and execute a select statement against a JSON array
    Check {
        /// The statement to execute, e.g. "select Entity e where e.age > 30"
        query: String,

        /// JSON array input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,
    },

    /// List the tokens of an expression
    Tokens {
        /// The expression to tokenize
        expr: String,
    },

    /// Print the syntax tree of an expression
    Ast {
        /// The expression to parse
        expr: String,

        /// Print as JSON instead of an S-expression
        #[arg(long)]
        json: bool,

        /// Indent the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            pretty,
            syntax_only,
        } => run_check(query, input, pretty, syntax_only),
        Commands::Tokens { expr } => cli::list_tokens(&expr).map(|lines| {
            for line in lines {
                println!("{}", line);
            }
        }),
        Commands::Ast { expr, json, pretty } => {
            let format = if json { AstFormat::Json } else { AstFormat::Sexpr };
            cli::show_ast(&expr, format, pretty).map(|out| println!("{}", out))
        }
    };

    if let Err(e) = result {
        eprintln!("ql: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn run_check(
    query: String,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    // Statements checked for syntax alone never need entities.
    let input = match input {
        None if !syntax_only => piped_stdin()?,
        given => given,
    };

    let options = CheckOptions {
        query,
        input,
        pretty,
        syntax_only,
    };
    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("ok: statement is well formed"),
        CheckResult::Success(rows) => println!("{}", rows),
    }
    Ok(())
}

/// Reads all of stdin, unless it is an interactive terminal.
fn piped_stdin() -> io::Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(Some(text))
}
