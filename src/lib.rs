// Monkey Language Interpreter Library
//
// Lexer, Pratt parser and tree-walking evaluator for the Monkey language,
// plus the REPL and script runner used by the `monkey` binary.

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod runner;

use std::sync::Once;

// Re-export commonly used items
pub use ast::{BlockStatement, Expression, Program, Statement};
pub use environment::{Env, Environment};
pub use error::{MonkeyError, ParseError, Span};
pub use evaluator::Evaluator;
pub use host::{BufferedHost, Host, StdHost};
pub use lexer::{Lexer, Token, TokenType};
pub use object::Object;
pub use parser::{parse, Parser};

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber. It is only installed when
/// `RUST_LOG` is set or `verbose` is true; `verbose` alone enables
/// `monkey=trace`.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) if verbose => EnvFilter::new("monkey=trace"),
            Err(_) => return,
        };

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}
