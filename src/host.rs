use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// The outside world as seen by the side-effecting builtins.
pub trait Host {
    /// Writes `text` to the output as-is.
    fn write(&mut self, text: &str);

    /// Reads one line without its trailing newline; `None` at end of input.
    fn read_line(&mut self) -> Option<String>;

    /// Requests process termination.
    fn exit(&mut self, code: i32);

    fn read_file(&mut self, path: &Path) -> io::Result<String>;

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Console, filesystem and process backed host used by the binary.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn write(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(error) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
            tracing::warn!(%error, "failed to write to stdout");
        }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
            Err(error) => {
                tracing::warn!(%error, "failed to read from stdin");
                None
            }
        }
    }

    fn exit(&mut self, code: i32) {
        tracing::info!(code, "exit requested by script");
        std::process::exit(code);
    }

    fn read_file(&mut self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// In-memory host: captures output, replays scripted input, records exit
/// requests instead of exiting and keeps files in a map.
#[derive(Debug, Default)]
pub struct BufferedHost {
    pub output: String,
    pub input: VecDeque<String>,
    pub exit_code: Option<i32>,
    pub files: HashMap<PathBuf, String>,
}

impl BufferedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Host for BufferedHost {
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }

    fn read_file(&mut self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
