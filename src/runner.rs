use crate::environment::Env;
use crate::error::{MonkeyError, ParseError};
use crate::evaluator::Evaluator;
use crate::host::Host;
use crate::lexer::{Lexer, TokenType};
use crate::object::Object;
use crate::parser;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub const MONKEY_BUSINESS: &str = "Woops! We ran into some monkey business here!";

/// How a script file is handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print the token stream instead of evaluating.
    pub tokens: bool,
    /// Render parse errors with source snippets.
    pub fancy_errors: bool,
}

/// Parses `source` and evaluates it in `env`. Nothing is evaluated when the
/// parser reports errors.
pub fn run<H: Host>(source: &str, evaluator: &mut Evaluator<H>, env: &Env) -> Result<Object, Vec<ParseError>> {
    let program = parser::parse(source)?;
    tracing::debug!(statements = program.statements.len(), "evaluating program");

    let result = evaluator.eval_program(&program, env);
    if let Object::Error(message) = &result {
        tracing::debug!(%message, "program finished with an error");
    }
    Ok(result)
}

pub fn read_source(path: &Path) -> Result<String, MonkeyError> {
    if !path.exists() {
        return Err(MonkeyError::FileNotFound(path.to_path_buf()));
    }

    fs::read_to_string(path).map_err(|source| MonkeyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Executes the script at `path`. Parse errors are printed before being
/// returned; evaluation errors come back as the resulting `Object::Error`.
pub fn run_file<H: Host>(
    path: &Path,
    options: RunOptions,
    evaluator: &mut Evaluator<H>,
    env: &Env,
) -> Result<Object, MonkeyError> {
    let source = read_source(path)?;
    tracing::info!(path = %path.display(), "running script");

    if options.tokens {
        dump_tokens(&mut io::stdout().lock(), &source)?;
        return Ok(Object::NULL);
    }

    match run(&source, evaluator, env) {
        Ok(result) => Ok(result),
        Err(errors) => {
            if options.fancy_errors {
                let filename = path.to_string_lossy();
                for error in &errors {
                    error.report(&source, Some(filename.as_ref()));
                }
            } else {
                print_parser_errors(&mut io::stdout().lock(), &errors)?;
            }
            Err(MonkeyError::Parse(errors))
        }
    }
}

pub fn print_parser_errors<W: Write>(out: &mut W, errors: &[ParseError]) -> io::Result<()> {
    writeln!(out, "{}\n", MONKEY_BUSINESS)?;
    writeln!(out, "parser errors:\n")?;
    for error in errors {
        writeln!(out, "\t{}", error.message)?;
    }
    Ok(())
}

/// Writes one token per line, Eof excluded.
pub fn dump_tokens<W: Write>(out: &mut W, source: &str) -> io::Result<()> {
    let mut lexer = Lexer::new(source);
    loop {
        let token = lexer.next_token();
        if token.token_type == TokenType::Eof {
            return Ok(());
        }
        writeln!(out, "{}", token)?;
    }
}
