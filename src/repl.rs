use crate::environment::Env;
use crate::error::MonkeyError;
use crate::evaluator::Evaluator;
use crate::host::Host;
use crate::lexer::{Lexer, TokenType};
use crate::runner;
use std::io::{self, BufRead, Write};

pub const PROMPT: &str = ">> ";
pub const CONTINUATION_PROMPT: &str = ".. ";

/// Interactive session on stdin/stdout.
pub fn start<H: Host>(evaluator: &mut Evaluator<H>, env: &Env) -> Result<(), MonkeyError> {
    println!("Hello! This is the Monkey programming language.");
    println!("Feel free to type in commands. An empty line quits.");

    let stdin = io::stdin();
    run_session(stdin.lock(), io::stdout(), evaluator, env)
}

/// Reads entries from `input` until an empty line or end of input. Every
/// entry is evaluated in the same `env`, so bindings persist across lines.
pub fn run_session<R, W, H>(mut input: R, mut output: W, evaluator: &mut Evaluator<H>, env: &Env) -> Result<(), MonkeyError>
where
    R: BufRead,
    W: Write,
    H: Host,
{
    loop {
        prompt(&mut output, PROMPT)?;
        let mut source = match read_line(&mut input)? {
            Some(line) if !line.trim().is_empty() => line,
            _ => break,
        };

        while needs_continuation(&source) {
            prompt(&mut output, CONTINUATION_PROMPT)?;
            match read_line(&mut input)? {
                Some(line) => {
                    source.push('\n');
                    source.push_str(&line);
                }
                None => break,
            }
        }

        match runner::run(&source, evaluator, env) {
            Ok(result) if result.is_null() => {}
            Ok(result) => writeln!(output, "{}", result)?,
            Err(errors) => runner::print_parser_errors(&mut output, &errors)?,
        }
    }

    Ok(())
}

fn prompt<W: Write>(output: &mut W, text: &str) -> io::Result<()> {
    write!(output, "{}", text)?;
    output.flush()
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

/// True while the entry opens more braces than it closes. Braces inside
/// string literals do not count.
fn needs_continuation(source: &str) -> bool {
    let mut depth = 0i64;
    for token in Lexer::new(source).tokenize() {
        match token.token_type {
            TokenType::LeftBrace => depth += 1,
            TokenType::RightBrace => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}
