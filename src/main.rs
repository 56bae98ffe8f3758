use clap::Parser;
use monkey::environment::Environment;
use monkey::error::MonkeyError;
use monkey::evaluator::Evaluator;
use monkey::runner::{self, RunOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "monkey", version, about = "A tree-walking interpreter for the Monkey language")]
struct Cli {
    /// The script file to execute
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Start the REPL; after FILE has run when both are given
    #[arg(short, long)]
    interactive: bool,

    /// Print the token stream of FILE instead of running it
    #[arg(long)]
    tokens: bool,

    /// Render parse errors with source snippets
    #[arg(long)]
    fancy_errors: bool,

    /// Enable trace logging (RUST_LOG overrides the filter)
    #[arg(long)]
    trace: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    monkey::init_tracing(cli.trace);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Already printed by the runner.
        Err(MonkeyError::Parse(_)) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<(), MonkeyError> {
    let mut evaluator = Evaluator::new();
    let env = Environment::new();

    if let Some(path) = &cli.file {
        let options = RunOptions {
            tokens: cli.tokens,
            fancy_errors: cli.fancy_errors,
        };
        runner::run_file(path, options, &mut evaluator, &env)?;
        if !cli.interactive {
            return Ok(());
        }
    }

    monkey::repl::start(&mut evaluator, &env)
}
