use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

/// A syntax problem found while parsing. The parser keeps going after
/// recording one of these, so a single pass can report several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: String, line: usize, column: usize, span: Span) -> Self {
        Self {
            message,
            line,
            column,
            span,
        }
    }

    /// Renders the error against `source` with ariadne. Used by the
    /// `--fancy-errors` CLI mode.
    pub fn report(&self, source: &str, filename: Option<&str>) {
        if let Err(error) = self.write_report(io::stdout().lock(), source, filename) {
            tracing::warn!(%error, "failed to render diagnostic");
            eprintln!("{}", self);
        }
    }

    pub fn write_report<W: Write>(&self, out: W, source: &str, filename: Option<&str>) -> io::Result<()> {
        let filename = filename.unwrap_or("<repl>");

        // Eof errors point one past the end of input; label the last char.
        let end = self.span.end.min(source.len());
        let start = self.span.start.min(end.saturating_sub(1));

        Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", "Parse Error".fg(Color::Yellow), self.message))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(Color::Yellow),
            )
            .with_note(format!(
                "{}: at line {}, column {}",
                "note".fg(Color::Cyan),
                self.line,
                self.column
            ))
            .finish()
            .write((filename, Source::from(source)), out)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Failures of the surrounding tooling: reading scripts, talking to the
/// terminal, or a program that did not parse. Evaluation failures are never
/// reported through this type; they are `Object::Error` values.
#[derive(Debug, Error)]
pub enum MonkeyError {
    #[error("file '{}' not found", .0.display())]
    FileNotFound(PathBuf),

    #[error("error reading file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} parser error(s)", .0.len())]
    Parse(Vec<ParseError>),

    #[error("console I/O failed: {0}")]
    Console(#[from] std::io::Error),
}
